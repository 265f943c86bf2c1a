use thiserror::Error;

#[derive(Error, Debug)]
pub enum OappError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIのURLが設定されていません。`oapp config --set-api-url URL` で設定してください")]
    MissingApiUrl,

    #[error("ローカルストレージエラー: {0}")]
    Storage(String),

    #[error("チャットリンクは http で始まる必要があります: {0}")]
    InvalidChatLink(String),

    #[error("リンクのタイトルとURLは必須です")]
    InvalidLink,

    #[error("リモートAPIエラー: {0}")]
    Gateway(#[from] GatewayError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] oapp_common::Error),
}

pub type Result<T> = std::result::Result<T, OappError>;

/// リモートゲートウェイのエラー
///
/// `Format` / `Rejected` はエンベロープの内容の問題、それ以外は通信の問題。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("通信エラー: {0}")]
    Transport(String),

    #[error("HTTPステータス異常: {0}")]
    HttpStatus(u16),

    #[error("タイムアウト ({0}秒)")]
    Timeout(u64),

    #[error("応答本文が不正: {0}")]
    MalformedBody(String),

    #[error("応答フォーマット不正: {0}")]
    Format(String),

    #[error("APIが要求を拒否: {0}")]
    Rejected(String),
}

impl GatewayError {
    /// フォーマットエラー（通信エラーではない）か
    pub fn is_format(&self) -> bool {
        matches!(self, GatewayError::Format(_) | GatewayError::Rejected(_))
    }
}
