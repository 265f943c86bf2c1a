//! 時刻の取得元（epochミリ秒）

/// 現在時刻の取得元
///
/// 自動同期の判定とローカルID生成に使う。テストでは固定時刻に差し替える。
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// 最終同期時刻の表示用文字列（未同期は "-"）
pub fn format_sync_time(ms: i64) -> String {
    if ms <= 0 {
        return "-".to_string();
    }
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2024() {
        assert!(SystemClock.now_ms() > 1_704_067_200_000);
    }

    #[test]
    fn test_format_never_synced() {
        assert_eq!(format_sync_time(0), "-");
    }

    #[test]
    fn test_format_sync_time() {
        let formatted = format_sync_time(1_700_000_000_000);
        assert_eq!(formatted.len(), "2023-11-14 22:13".len());
        assert!(formatted.starts_with("2023-11-1"));
    }
}
