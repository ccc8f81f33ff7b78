//! trace3-parse エラー型

use trace3_frame::HeaderError;

/// パース全体のエラー
///
/// 致命的なのはファイルを trace3 として認識できない場合だけ。
/// 末尾の壊れたフレームはエラーではなく `ParsedTrace::warning` になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// プリアンブル終端子が見つからない
    UnrecognizedFile(HeaderError),
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::UnrecognizedFile(e) => write!(f, "unrecognized file: {}", e),
        }
    }
}

impl From<HeaderError> for ParseError {
    fn from(e: HeaderError) -> Self {
        ParseError::UnrecognizedFile(e)
    }
}
