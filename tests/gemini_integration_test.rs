use candle_studio::backend::{GenAiBackend, GeminiClient};
use candle_studio::config::{API_KEY_ENV, DEFAULT_LISTING_MODEL, DEFAULT_UPSTREAM_BASE_URL};
use candle_studio_common::{parse_listing_response, GenerateContentRequest, GenerationConfig, Part};

#[tokio::test]
async fn gemini_listing_integration() {
    let api_key = match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("{} not set; skipping integration test", API_KEY_ENV);
            return;
        }
    };

    let prompt = r##"Return ONLY a JSON object exactly in this format:
{
  "title": "Świeca sojowa o zapachu wanilii",
  "description": "Ręcznie robiona świeca z wosku sojowego.",
  "tags": ["#świeca", "#handmade"]
}
"##;

    let request = GenerateContentRequest::from_parts(vec![Part::text(prompt)]).with_config(
        GenerationConfig {
            temperature: Some(0.1),
            response_mime_type: Some("application/json".into()),
            ..Default::default()
        },
    );

    let client = GeminiClient::direct(DEFAULT_UPSTREAM_BASE_URL, api_key);
    let response = client
        .generate_content(DEFAULT_LISTING_MODEL, &request)
        .await
        .expect("gemini api failed");

    let listing = parse_listing_response(&response).expect("failed to parse listing response");
    assert!(!listing.title.is_empty());
    assert!(!listing.tags.is_empty());
}
