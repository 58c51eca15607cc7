//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// sender / text / room が不正（状態は変更されていない）
    #[error("{0}")]
    Validation(#[from] ValueObjectError),

    /// 履歴への追加に失敗
    #[error("Failed to store message: {0}")]
    Repository(#[from] RepositoryError),
}

/// poll のエラー
///
/// タイムアウトはエラーではなく正常終了の一種。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// client_id / room が不正
    #[error("{0}")]
    Validation(#[from] ValueObjectError),
}

/// 履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetHistoryError {
    /// room / limit が不正
    #[error("{0}")]
    Validation(#[from] ValueObjectError),
}

/// クライアント切断のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectClientError {
    /// client_id が不正
    #[error("{0}")]
    Validation(#[from] ValueObjectError),
}
