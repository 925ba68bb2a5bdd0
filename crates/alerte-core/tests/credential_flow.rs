//! End-to-end credential cache scenarios across all three tiers.

use std::sync::Arc;

use alerte_core::{
    CredentialCache, MemorySecureStore, SecureStore, SettingsStore, EMAIL_KEY, TOKEN_KEY,
};
use alerte_store::CredentialDb;

struct Tiers {
    cache: CredentialCache,
    secure: Arc<MemorySecureStore>,
    db: CredentialDb,
    _dir: tempfile::TempDir,
}

async fn tiers() -> Tiers {
    let dir = tempfile::tempdir().unwrap();
    let secure = Arc::new(MemorySecureStore::new());
    let db = CredentialDb::open(&dir.path().join("credentials.db"))
        .await
        .unwrap();
    let settings = Arc::new(SettingsStore::open(dir.path().join("settings.json")));
    let cache = CredentialCache::new(secure.clone(), db.clone(), settings);
    Tiers {
        cache,
        secure,
        db,
        _dir: dir,
    }
}

#[tokio::test]
async fn fresh_cache_has_no_token() {
    let t = tiers().await;
    assert_eq!(t.cache.get_token(TOKEN_KEY).await, None);
}

#[tokio::test]
async fn save_then_read_back() {
    let t = tiers().await;
    t.cache
        .save_token(TOKEN_KEY, "abc123", "user@example.com")
        .await;
    assert_eq!(
        t.cache.get_token(TOKEN_KEY).await,
        Some("abc123".to_string())
    );
    assert_eq!(
        t.cache.get_user_email().await,
        Some("user@example.com".to_string())
    );

    // Every tier received the write.
    assert_eq!(
        t.secure.retrieve(TOKEN_KEY).await.unwrap(),
        Some("abc123".to_string())
    );
    let row = t.db.fetch().await.unwrap().unwrap();
    assert_eq!(row.token, "abc123");
    assert_eq!(row.user_email, "user@example.com");
}

#[tokio::test]
async fn relational_hit_backfills_the_secure_store() {
    let t = tiers().await;
    t.db.replace("xyz", "u@x.com").await.unwrap();

    assert_eq!(t.cache.get_token(TOKEN_KEY).await, Some("xyz".to_string()));
    assert_eq!(
        t.secure.retrieve(TOKEN_KEY).await.unwrap(),
        Some("xyz".to_string())
    );
}

#[tokio::test]
async fn clear_makes_every_tier_absent() {
    let t = tiers().await;
    t.cache.save_token(TOKEN_KEY, "abc123", "").await;
    t.cache.clear_all().await;

    assert_eq!(t.cache.get_token(TOKEN_KEY).await, None);
    assert_eq!(t.secure.retrieve(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(t.secure.retrieve(EMAIL_KEY).await.unwrap(), None);
    assert_eq!(t.db.fetch().await.unwrap(), None);
}

#[tokio::test]
async fn repeated_reads_are_idempotent() {
    let t = tiers().await;
    t.db.replace("stable", "").await.unwrap();

    let first = t.cache.get_token(TOKEN_KEY).await;
    let second = t.cache.get_token(TOKEN_KEY).await;
    assert_eq!(first, second);
    assert_eq!(first, Some("stable".to_string()));
    // Beyond the first read's promotion, the authoritative copy is unmoved.
    assert_eq!(t.db.fetch().await.unwrap().unwrap().token, "stable");
}

#[tokio::test]
async fn broken_keychain_never_fails_an_operation() {
    let t = tiers().await;
    t.secure.set_fail_all(true);

    t.cache
        .save_token(TOKEN_KEY, "resilient", "u@example.com")
        .await;
    t.cache.warmup().await;
    assert_eq!(
        t.cache.get_token(TOKEN_KEY).await,
        Some("resilient".to_string())
    );
    t.cache.clear_all().await;
    assert_eq!(t.cache.get_token(TOKEN_KEY).await, None);

    // With memory cleared too, the relational value is still reachable.
    t.db.replace("row-only", "").await.unwrap();
    assert_eq!(
        t.cache.get_token(TOKEN_KEY).await,
        Some("row-only".to_string())
    );
}

#[tokio::test]
async fn concurrent_save_and_get_never_mix() {
    let t = tiers().await;
    t.cache
        .save_token(TOKEN_KEY, "old", "old@example.com")
        .await;

    let writer = {
        let cache = t.cache.clone();
        tokio::spawn(async move {
            cache
                .save_token(TOKEN_KEY, "new", "new@example.com")
                .await;
        })
    };
    let reader = {
        let cache = t.cache.clone();
        tokio::spawn(async move { cache.get_token(TOKEN_KEY).await })
    };

    let token = reader.await.unwrap();
    writer.await.unwrap();
    assert!(
        token.as_deref() == Some("old") || token.as_deref() == Some("new"),
        "reader saw a half-written value: {token:?}"
    );

    // After both complete, every tier agrees on the new pair.
    assert_eq!(t.cache.get_token(TOKEN_KEY).await, Some("new".to_string()));
    assert_eq!(
        t.cache.get_user_email().await,
        Some("new@example.com".to_string())
    );
    let row = t.db.fetch().await.unwrap().unwrap();
    assert_eq!((row.token.as_str(), row.user_email.as_str()), ("new", "new@example.com"));
}

#[tokio::test]
async fn concurrent_save_and_clear_settle_whole() {
    let t = tiers().await;

    let writer = {
        let cache = t.cache.clone();
        tokio::spawn(async move {
            cache
                .save_token(TOKEN_KEY, "racing", "race@example.com")
                .await;
        })
    };
    let clearer = {
        let cache = t.cache.clone();
        tokio::spawn(async move { cache.clear_all().await })
    };
    writer.await.unwrap();
    clearer.await.unwrap();

    // Whichever operation ran last, the cache is coherent: a full pair or
    // nothing, never a token from one save with state from another.
    let token = t.cache.get_token(TOKEN_KEY).await;
    let email = t.cache.get_user_email().await;
    match token.as_deref() {
        Some("racing") => assert_eq!(email.as_deref(), Some("race@example.com")),
        None => assert_eq!(email, None),
        other => panic!("unexpected token after race: {other:?}"),
    }
}
