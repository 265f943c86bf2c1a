//! ユーザー向け通知（トースト相当）
//!
//! コアは通知を発行するだけで、表示方法は呼び出し側の`Notifier`が決める。
//! 文言は既存アプリのポーランド語表示に合わせている。

use oapp_common::Kind;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 手動同期時にオフライン
    ShowingLocalData,
    Refreshing(Kind),
    Updated(Kind),
    FormatError,
    SyncError,

    /// ローカル保留レコードのステータス変更
    LocalOnlyStatus,
    StatusSynced,
    StatusFailed,
    StatusOffline,

    Sending,
    Added,
    SendFailed,
    SavedOffline,

    ConnectionLost,
    ConnectionRestored,

    /// 保留中の操作を再送した件数
    PendingFlushed(usize),
    /// サーバーに拒否された保留中の操作を破棄
    PendingRejected,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ShowingLocalData => write!(f, "Brak sieci. Pokazuję dane lokalne."),
            Notice::Refreshing(Kind::Orders) => write!(f, "Odświeżanie zapotrzebowań..."),
            Notice::Refreshing(Kind::Items) => write!(f, "Odświeżanie pytań..."),
            Notice::Updated(Kind::Orders) => write!(f, "Zapotrzebowania zaktualizowane."),
            Notice::Updated(Kind::Items) => write!(f, "Pytania zaktualizowane."),
            Notice::FormatError => write!(f, "Błąd formatu danych."),
            Notice::SyncError => write!(f, "Błąd synchronizacji."),
            Notice::LocalOnlyStatus => {
                write!(f, "Element lokalny - status zaktualizowany tylko lokalnie.")
            }
            Notice::StatusSynced => write!(f, "Status zaktualizowany w chmurze."),
            Notice::StatusFailed => {
                write!(f, "Błąd aktualizacji statusu online. Zmiana zapisana lokalnie.")
            }
            Notice::StatusOffline => write!(f, "Offline. Status zmieniony lokalnie."),
            Notice::Sending => write!(f, "Wysyłanie..."),
            Notice::Added => write!(f, "Dodano pomyślnie."),
            Notice::SendFailed => write!(f, "Błąd wysyłania. Zapisano lokalnie."),
            Notice::SavedOffline => write!(f, "Offline. Zapisano lokalnie."),
            Notice::ConnectionLost => write!(f, "Brak sieci. Tryb offline."),
            Notice::ConnectionRestored => write!(f, "Online. Przywrócono połączenie."),
            Notice::PendingFlushed(n) => write!(f, "Wysłano zaległe zmiany: {}.", n),
            Notice::PendingRejected => write!(f, "Serwer odrzucił zaległą zmianę. Usunięto ją."),
        }
    }
}

impl Notice {
    /// オフラインが原因の通知か
    pub fn is_offline(&self) -> bool {
        matches!(
            self,
            Notice::ShowingLocalData
                | Notice::StatusOffline
                | Notice::SavedOffline
                | Notice::ConnectionLost
        )
    }

    /// リモート失敗でローカルのみ保存された通知か
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            Notice::StatusFailed | Notice::SendFailed | Notice::PendingRejected
        )
    }
}

/// 通知の出力先（応答なし・投げっぱなし）
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// 通知を捨てる
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: Notice) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_messages() {
        assert_eq!(Notice::Updated(Kind::Items).to_string(), "Pytania zaktualizowane.");
        assert_eq!(Notice::SavedOffline.to_string(), "Offline. Zapisano lokalnie.");
        assert_eq!(Notice::PendingFlushed(2).to_string(), "Wysłano zaległe zmiany: 2.");
    }

    #[test]
    fn test_notice_classification() {
        assert!(Notice::StatusOffline.is_offline());
        assert!(!Notice::StatusOffline.is_degraded());
        assert!(Notice::StatusFailed.is_degraded());
        assert!(!Notice::StatusSynced.is_offline());
        assert!(Notice::PendingRejected.is_degraded());
    }
}
