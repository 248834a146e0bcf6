use candle_studio_common::BackgroundStyle;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "candle-studio")]
#[command(about = "Zdjęcia świec: nowe tło i opis ogłoszenia z AI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真から出品文と背景加工済み画像を生成
    Generate {
        /// 画像ファイルまたはフォルダ（最大4枚）
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 背景スタイル（christmas/cozy/living-room/minimalist/luxury/nature）
        #[arg(short, long)]
        style: Option<BackgroundStyle>,

        /// 出力フォルダ（デフォルト: ./candle-studio-日時）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// プロキシURL（設定ファイル・環境変数より優先）
        #[arg(long)]
        proxy_url: Option<String>,
    },

    /// APIキーを隠す中継サーバーを起動
    Serve {
        /// 待ち受けアドレス
        #[arg(short, long, default_value = "127.0.0.1:8888")]
        bind: SocketAddr,
    },

    /// 背景スタイル一覧
    Styles,

    /// 設定
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// プロキシURLを設定（空文字で解除）
        #[arg(long)]
        set_proxy_url: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}
