mod common;

use tcb_fetch::ChapterAssembler;
use tcb_fetch::bot::{ChapterBot, HELP, Reply};
use wiremock::MockServer;

use common::*;

async fn bot(server: &MockServer, dir: &tempfile::TempDir) -> ChapterBot {
    ChapterBot::new(ChapterAssembler::new(site_config(server), dir.path()).unwrap())
}

#[tokio::test]
async fn download_sends_progress_then_the_chapter() {
    let server = MockServer::start().await;
    mount_listing(&server, &[1044]).await;
    mount_chapter(&server, 1044, &[(10, 0), (20, 0)], Some(1)).await;
    let dir = tempfile::tempdir().unwrap();

    let replies = bot(&server, &dir).await.handle("luffy", "/download 1044").await;

    assert_eq!(replies.len(), 2);
    assert_eq!(
        replies[0],
        Reply::Text("⏳ Downloading chapter 1044, please wait...".to_owned())
    );
    match &replies[1] {
        Reply::Document { path, caption } => {
            assert_eq!(path, &dir.path().join("1044.pdf"));
            assert!(path.is_file());
            assert!(caption.ends_with("Here you have your chapter, enjoy it!"));
        }
        other => panic!("expected a document, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_chapter_is_reported_as_not_available() {
    let server = MockServer::start().await;
    mount_listing(&server, &[1]).await;
    let dir = tempfile::tempdir().unwrap();

    let replies = bot(&server, &dir).await.handle("zoro", "/download 9999").await;

    assert_eq!(
        replies.last(),
        Some(&Reply::Text("❌ Chapter 9999 is not yet available.".to_owned()))
    );
}

#[tokio::test]
async fn other_failures_get_a_generic_reply() {
    let server = MockServer::start().await;
    mount_listing(&server, &[2]).await;
    mount_chapter(&server, 2, &[], None).await;
    let dir = tempfile::tempdir().unwrap();

    let replies = bot(&server, &dir).await.handle("nami", "/download 2").await;

    assert_eq!(
        replies.last(),
        Some(&Reply::Text("🐛 Unexpected error found...".to_owned()))
    );
}

#[tokio::test]
async fn invalid_chapter_number_never_reaches_the_site() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(&server, &dir).await;

    for argument in ["abc", "0", "-3", ""] {
        let replies = bot.handle("usopp", &format!("/download {}", argument)).await;
        assert_eq!(
            replies,
            vec![Reply::Text(format!(
                "❌ Invalid chapter number: {}...",
                argument
            ))]
        );
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn start_greets_the_user_and_explains_usage() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let replies = bot(&server, &dir).await.handle("Sanji", "/start").await;

    assert_eq!(replies.len(), 2);
    assert!(matches!(&replies[0], Reply::Text(text) if text.contains("Hi Sanji!")));
    assert_eq!(replies[1], Reply::Text(HELP.to_owned()));
}

#[tokio::test]
async fn help_plain_text_and_unknown_commands() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(&server, &dir).await;

    assert_eq!(bot.handle("chopper", "/help").await, vec![Reply::Text(HELP.to_owned())]);
    assert_eq!(
        bot.handle("chopper", "hello there").await,
        vec![Reply::Text(
            "❌ I can't help you, seems you sent an invalid command...".to_owned()
        )]
    );
    assert!(bot.handle("chopper", "/settings").await.is_empty());
}

#[tokio::test]
async fn site_bot_keeps_chapters_in_the_temp_dir() {
    let server = MockServer::start().await;
    // Unlikely to collide with a real chapter left in the shared temp dir.
    let chapter = 900_000 + std::process::id() % 90_000;
    mount_listing(&server, &[chapter]).await;
    mount_chapter(&server, chapter, &[(10, 0)], None).await;

    let bot = ChapterBot::with_site(site_config(&server)).unwrap();
    assert_eq!(bot.assembler().output_dir(), std::env::temp_dir().as_path());

    let replies = bot.handle("robin", &format!("/download {}", chapter)).await;

    let expected = std::env::temp_dir().join(format!("{}.pdf", chapter));
    assert!(matches!(replies.last(), Some(Reply::Document { path, .. }) if *path == expected));
    std::fs::remove_file(&expected).unwrap();
}
