//! In-process backend for development and tests.
//!
//! Mirrors the Redis semantics the store relies on: string values with a
//! per-key expiry, glob `MATCH` patterns, and numeric scan cursors. A cursor
//! remembers the last key it visited, so a key present for the whole scan is
//! returned even when other keys are removed between pages. Expiry follows
//! the tokio clock so paused-time tests can advance it.

use super::{KeyValueBackend, ScanPage};
use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Resume positions of unfinished scans, by cursor.
#[derive(Debug, Default)]
struct ScanCursors {
    resume_after: HashMap<u64, String>,
    last_issued: u64,
}

impl ScanCursors {
    fn issue(&mut self, last_key: String) -> u64 {
        self.last_issued = self.last_issued.checked_add(1).unwrap_or(1);
        self.resume_after.insert(self.last_issued, last_key);
        self.last_issued
    }
}

/// Key-value store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, Entry>>,
    cursors: Mutex<ScanCursors>,
    closed: AtomicBool,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired keys.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().values().filter(|e| e.is_live(now)).count()
    }

    /// Returns true if no unexpired key is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `key` is stored and unexpired.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries.lock().get(key).is_some_and(|e| e.is_live(now))
    }

    /// Stores a raw string without going through the store's serializer.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        self.entries.lock().insert(
            key.into(),
            Entry {
                value: value.into(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn ensure_open(&self) -> CacheResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CacheError::Closed);
        }
        Ok(())
    }

    fn sweep_expired(entries: &mut BTreeMap<String, Entry>, now: Instant) {
        entries.retain(|_, entry| entry.is_live(now));
    }

    fn remove_live(entries: &mut BTreeMap<String, Entry>, key: &str, now: Instant) -> bool {
        entries.remove(key).is_some_and(|e| e.is_live(now))
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        self.ensure_open()?;
        if ttl_secs == 0 {
            return Err(CacheError::Backend("invalid expire time in 'setex' command".to_string()));
        }

        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::sweep_expired(&mut entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        self.ensure_open()?;
        let removed = Self::remove_live(&mut self.entries.lock(), key, Instant::now());
        Ok(u64::from(removed))
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> CacheResult<ScanPage> {
        self.ensure_open()?;
        let resume_after = match cursor {
            0 => None,
            _ => Some(
                self.cursors
                    .lock()
                    .resume_after
                    .remove(&cursor)
                    .ok_or_else(|| CacheError::Backend(format!("invalid cursor {cursor}")))?,
            ),
        };

        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::sweep_expired(&mut entries, now);

        let visited: Vec<&String> = match &resume_after {
            Some(last) => entries.range::<str, _>((Excluded(last.as_str()), Unbounded)),
            None => entries.range::<str, _>(..),
        }
        .take(count.max(1))
        .map(|(key, _)| key)
        .collect();

        let keys = visited
            .iter()
            .filter(|key| glob_match(pattern, key))
            .map(|key| (*key).clone())
            .collect();

        let next = match visited.last() {
            Some(last) if entries.range::<str, _>((Excluded(last.as_str()), Unbounded)).next().is_some() => {
                self.cursors.lock().issue((*last).clone())
            }
            _ => 0,
        };

        Ok(ScanPage::new(next, keys))
    }

    async fn del_many(&self, keys: &[String]) -> CacheResult<u64> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let removed = keys
            .iter()
            .filter(|key| Self::remove_live(&mut entries, key, now))
            .count();
        Ok(removed as u64)
    }

    async fn ping(&self) -> CacheResult<()> {
        self.ensure_open()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.entries.lock().clear();
        self.cursors.lock().resume_after.clear();
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

/// Redis-style glob matching: `*`, `?`, `[abc]`, `[^a-z]` and `\` escapes.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_at(&pattern, &text)
}

fn glob_match_at(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    // position to resume from after the last `*`
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        let step = match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
                continue;
            }
            Some('?') => Some(1),
            Some('[') => match_class(&pattern[p..], text[t]),
            Some('\\') if p + 1 < pattern.len() => (pattern[p + 1] == text[t]).then_some(2),
            Some(c) => (*c == text[t]).then_some(1),
            None => None,
        };

        match step {
            Some(width) => {
                p += width;
                t += 1;
            }
            None => match backtrack {
                Some((star, consumed)) => {
                    p = star + 1;
                    t = consumed + 1;
                    backtrack = Some((star, consumed + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

/// Matches `c` against the class at the start of `pattern`.
/// Returns the class width on a match.
fn match_class(pattern: &[char], c: char) -> Option<usize> {
    let mut i = 1;
    let negate = pattern.get(i) == Some(&'^');
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < pattern.len() && pattern[i] != ']' {
        if pattern[i] == '\\' && i + 1 < pattern.len() {
            matched |= pattern[i + 1] == c;
            i += 2;
        } else if i + 2 < pattern.len() && pattern[i + 1] == '-' && pattern[i + 2] != ']' {
            let (lo, hi) = if pattern[i] <= pattern[i + 2] {
                (pattern[i], pattern[i + 2])
            } else {
                (pattern[i + 2], pattern[i])
            };
            matched |= (lo..=hi).contains(&c);
            i += 3;
        } else {
            matched |= pattern[i] == c;
            i += 1;
        }
    }

    // unterminated class: Redis treats the end of pattern as the closing bracket
    let width = if i < pattern.len() { i + 1 } else { i };
    (matched != negate).then_some(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_literals_and_wildcards() {
        assert!(glob_match("product:1", "product:1"));
        assert!(!glob_match("product:1", "product:12"));
        assert!(glob_match("product:*", "product:12"));
        assert!(glob_match("product:*", "product:"));
        assert!(glob_match("*", ""));
        assert!(glob_match("product:list*", "product:list:page:2"));
        assert!(!glob_match("product:list*", "product:detail:id:1"));
        assert!(glob_match("*:id:*", "product:detail:id:1"));
        assert!(glob_match("user:?", "user:7"));
        assert!(!glob_match("user:?", "user:77"));
    }

    #[test]
    fn test_glob_classes() {
        assert!(glob_match("h[ae]llo", "hallo"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        assert!(glob_match("v[0-9]", "v5"));
        assert!(!glob_match("v[0-9]", "vx"));
    }

    #[test]
    fn test_glob_escapes() {
        assert!(glob_match("a\\*b", "a*b"));
        assert!(!glob_match("a\\*b", "axb"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let backend = MemoryBackend::new();
        backend.set_ex("k", "v", 2).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_millis(2001)).await;
        assert_eq!(backend.get("k").await.unwrap(), None);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_rejected() {
        let backend = MemoryBackend::new();
        assert!(matches!(backend.set_ex("k", "v", 0).await, Err(CacheError::Backend(_))));
    }

    #[tokio::test]
    async fn test_scan_pages_through_all_keys() {
        let backend = MemoryBackend::new();
        for i in 0..25 {
            backend.set_ex(&format!("product:{i}"), "1", 60).await.unwrap();
            backend.set_ex(&format!("user:{i}"), "1", 60).await.unwrap();
        }

        let mut cursor = 0;
        let mut found = Vec::new();
        let mut pages = 0;
        loop {
            let page = backend.scan(cursor, "product:*", 10).await.unwrap();
            found.extend(page.keys);
            pages += 1;
            cursor = page.cursor;
            if cursor == 0 {
                break;
            }
        }

        assert_eq!(found.len(), 25);
        assert_eq!(pages, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_survives_removals_between_pages() {
        let backend = MemoryBackend::new();
        backend.set_ex("a:short", "1", 1).await.unwrap();
        for i in 0..20 {
            backend.set_ex(&format!("product:list:{i:02}"), "1", 60).await.unwrap();
        }

        let first = backend.scan(0, "product:list:*", 10).await.unwrap();
        assert_ne!(first.cursor, 0);

        // evict a key that sorts before the cursor position
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(backend.get("a:short").await.unwrap(), None);

        let mut found = first.keys;
        found.extend(scan_all_from(&backend, first.cursor, "product:list:*").await);
        found.sort();
        found.dedup();

        let expected: Vec<String> = (0..20).map(|i| format!("product:list:{i:02}")).collect();
        assert_eq!(found, expected);
    }

    async fn scan_all_from(backend: &MemoryBackend, mut cursor: u64, pattern: &str) -> Vec<String> {
        let mut found = Vec::new();
        while cursor != 0 {
            let page = backend.scan(cursor, pattern, 10).await.unwrap();
            found.extend(page.keys);
            cursor = page.cursor;
        }
        found
    }

    #[tokio::test]
    async fn test_scan_while_deleting_matched_keys() {
        let backend = MemoryBackend::new();
        for i in 0..30 {
            backend.set_ex(&format!("k:{i:02}"), "1", 60).await.unwrap();
        }

        let mut cursor = 0;
        let mut seen = 0;
        loop {
            let page = backend.scan(cursor, "k:*", 7).await.unwrap();
            seen += page.keys.len();
            backend.del_many(&page.keys).await.unwrap();
            cursor = page.cursor;
            if cursor == 0 {
                break;
            }
        }

        assert_eq!(seen, 30);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_cursor_is_rejected() {
        let backend = MemoryBackend::new();
        backend.set_ex("k", "1", 60).await.unwrap();
        assert!(matches!(backend.scan(42, "*", 10).await, Err(CacheError::Backend(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_swept_on_write() {
        let backend = MemoryBackend::new();
        for i in 0..5 {
            backend.set_ex(&format!("old:{i}"), "1", 1).await.unwrap();
        }
        tokio::time::advance(Duration::from_secs(2)).await;

        backend.set_ex("fresh", "1", 60).await.unwrap();
        assert_eq!(backend.entries.lock().len(), 1);
        assert!(backend.contains("fresh"));
    }

    #[tokio::test]
    async fn test_del_many_counts_removed() {
        let backend = MemoryBackend::new();
        backend.set_ex("a", "1", 60).await.unwrap();
        backend.set_ex("b", "1", 60).await.unwrap();

        let removed = backend
            .del_many(&["a".to_string(), "b".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_closed_backend_errors() {
        let backend = MemoryBackend::new();
        backend.close().await;
        assert!(matches!(backend.get("k").await, Err(CacheError::Closed)));
        assert!(matches!(backend.ping().await, Err(CacheError::Closed)));
    }
}
