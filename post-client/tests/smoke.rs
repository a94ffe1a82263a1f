use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use post_client::{
    Credentials, HttpTransport, MemoryCredentialStore, PostClient, PostDraft, PostQuery,
    Registration, TransportConfig,
};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{}", nanos % 1_000_000_000)
}

#[tokio::test]
#[ignore = "requires running backend"]
async fn http_smoke_flow() {
    let base_url = std::env::var("POSTS_API_URL")
        .unwrap_or_else(|_| post_client::DEFAULT_BASE_URL.to_string());
    let store = Arc::new(MemoryCredentialStore::default());
    let transport = HttpTransport::new(
        TransportConfig {
            base_url,
            ..TransportConfig::default()
        },
        store.clone(),
    )
    .expect("transport must build");
    let mut client = PostClient::new(transport, store);

    let suffix = unique_suffix();
    let username = format!("smoke_{suffix}");
    let password = "Password123";
    let registration = Registration {
        username: username.clone(),
        password: password.to_string(),
        first_name: "Smoke".to_string(),
        last_name: "Test".to_string(),
        gender: "M".to_string(),
        email: format!("smoke_{suffix}@example.com"),
    };

    client
        .register(&registration, password)
        .await
        .expect("register must succeed");
    assert!(!client.session().is_authenticated());

    client
        .login(&Credentials {
            username: username.clone(),
            password: password.to_string(),
        })
        .await
        .expect("login must succeed");
    assert_eq!(client.session().username(), Some(username.as_str()));

    let created = client
        .create_post(&PostDraft {
            title: "smoke title".to_string(),
            content: "smoke content long enough".to_string(),
        })
        .await
        .expect("create_post must succeed");

    let listed = client
        .fetch_posts(PostQuery {
            my_posts: true,
            ..PostQuery::default()
        })
        .await
        .expect("fetch_posts must succeed");
    assert!(listed.items.iter().any(|post| post.id == created.id));

    let updated = client
        .update_post(
            created.id,
            &PostDraft {
                title: "smoke title updated".to_string(),
                content: "smoke content updated".to_string(),
            },
        )
        .await
        .expect("update_post must succeed");
    assert_eq!(updated.title, "smoke title updated");

    client
        .delete_post(created.id)
        .await
        .expect("delete_post must succeed");

    let after_delete = client.fetch_post(created.id).await.expect("not found is ok");
    assert!(after_delete.is_none());
}
