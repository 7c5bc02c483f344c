use pensum_course::{
    CatalogFilter, TopicInput, UpdateChapterInput,
    access::{Access, Unlock},
    gate::{CompletionGate, Resource},
};
use pensum_shared::Error;
use temp_dir::TempDir;
use time::{Duration, OffsetDateTime};

mod helpers;

#[tokio::test]
async fn paid_course_with_a_free_preview() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, query) = helpers::setup(&state);
    let (course_id, chapters) =
        helpers::create_published_course(&cmd, "Rust 101", Some(50_000), 2).await?;

    cmd.update_chapter(
        &helpers::teacher(),
        &course_id,
        &chapters[0],
        UpdateChapterInput {
            is_free: Some(true),
            ..Default::default()
        },
    )
    .await?;

    let detail = query
        .course_detail("john", &course_id, OffsetDateTime::now_utc())
        .await?;
    let preview = &detail.topics[0].chapters[0];
    let paid = &detail.topics[0].chapters[1];

    assert!(!detail.has_access);
    assert!(!preview.is_locked);
    assert_eq!(preview.unlock, Some(Unlock::FreePreview));
    assert!(paid.is_locked);
    assert_eq!(paid.unlock, None);

    let view = query
        .chapter_view("john", &course_id, &chapters[1], OffsetDateTime::now_utc())
        .await?;
    assert!(view.is_locked);
    assert_eq!(view.video_url, None);

    let view = query
        .chapter_view("john", &course_id, &chapters[0], OffsetDateTime::now_utc())
        .await?;
    assert!(!view.is_locked);
    assert!(view.video_url.is_some());
    assert_eq!(view.next_chapter_id.as_deref(), Some(chapters[1].as_str()));

    Ok(())
}

#[tokio::test]
async fn purchase_unlocks_every_chapter() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, query) = helpers::setup(&state);
    let (course_id, _) = helpers::create_published_course(&cmd, "Rust 101", Some(50_000), 3).await?;

    cmd.grant_purchase(&helpers::teacher(), &course_id, "john")
        .await?;

    let detail = query
        .course_detail("john", &course_id, OffsetDateTime::now_utc())
        .await?;
    assert!(detail.has_purchase);
    assert!(
        detail.topics[0]
            .chapters
            .iter()
            .all(|chapter| chapter.unlock == Some(Unlock::Purchased))
    );

    Ok(())
}

#[tokio::test]
async fn unlock_date_opens_the_chapter_once_reached() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, query) = helpers::setup(&state);
    let (course_id, chapters) =
        helpers::create_published_course(&cmd, "Rust 101", Some(50_000), 1).await?;

    let now = OffsetDateTime::from_unix_timestamp(1_760_000_000)?;
    cmd.update_chapter(
        &helpers::teacher(),
        &course_id,
        &chapters[0],
        UpdateChapterInput {
            unlock_at: Some(Some(now + Duration::days(7))),
            ..Default::default()
        },
    )
    .await?;

    let access = query
        .chapter_access("john", &course_id, &chapters[0], now)
        .await?;
    assert_eq!(access, Access::Locked);

    let err = query
        .set_chapter_completion("john", &course_id, &chapters[0], true, now)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden));

    let later = now + Duration::days(7);
    let access = query
        .chapter_access("john", &course_id, &chapters[0], later)
        .await?;
    assert_eq!(access, Access::Unlocked(Unlock::UnlockDateReached));

    let progress = query
        .set_chapter_completion("john", &course_id, &chapters[0], true, later)
        .await?;
    assert_eq!(progress, 100);

    Ok(())
}

#[tokio::test]
async fn toggling_completion_twice_restores_progress() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, query) = helpers::setup(&state);
    let (course_id, chapters) = helpers::create_published_course(&cmd, "Rust 101", None, 4).await?;
    let now = OffsetDateTime::now_utc();

    let progress = query
        .set_chapter_completion("john", &course_id, &chapters[0], true, now)
        .await?;
    assert_eq!(progress, 25);

    let progress = query
        .set_chapter_completion("john", &course_id, &chapters[0], false, now)
        .await?;
    assert_eq!(progress, 0);

    let progress = query
        .set_chapter_completion("john", &course_id, &chapters[0], true, now)
        .await?;
    assert_eq!(progress, 25);

    let detail = query.course_detail("john", &course_id, now).await?;
    assert!(detail.topics[0].chapters[0].is_completed);
    assert!(!detail.topics[0].chapters[1].is_completed);
    assert_eq!(detail.progress, 25);

    Ok(())
}

#[tokio::test]
async fn hidden_chapters_are_not_found() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, query) = helpers::setup(&state);
    let (course_id, _) = helpers::create_published_course(&cmd, "Rust 101", None, 1).await?;
    let draft = helpers::create_chapter(&cmd, &course_id, "Draft", None, false).await?;

    let err = query
        .chapter_view("john", &course_id, &draft, OffsetDateTime::now_utc())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound("chapter")));

    let err = query
        .set_chapter_completion("john", &course_id, &draft, true, OffsetDateTime::now_utc())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound("chapter")));

    Ok(())
}

#[tokio::test]
async fn topics_group_chapters_and_loose_ones_trail() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, query) = helpers::setup(&state);
    let course_id = helpers::create_course(&cmd, "Rust 101", None).await?;

    let basics = cmd
        .create_topic(
            &helpers::teacher(),
            &course_id,
            TopicInput {
                title: "Basics".to_owned(),
            },
        )
        .await?;
    let advanced = cmd
        .create_topic(
            &helpers::teacher(),
            &course_id,
            TopicInput {
                title: "Advanced".to_owned(),
            },
        )
        .await?;
    cmd.publish_topic(&helpers::teacher(), &course_id, &basics)
        .await?;

    let variables =
        helpers::create_chapter(&cmd, &course_id, "Variables", Some(&basics), true).await?;
    helpers::create_chapter(&cmd, &course_id, "Unsafe", Some(&advanced), true).await?;
    let appendix = helpers::create_chapter(&cmd, &course_id, "Appendix", None, true).await?;
    cmd.publish_course(&helpers::teacher(), &course_id).await?;

    let detail = query
        .course_detail("john", &course_id, OffsetDateTime::now_utc())
        .await?;

    assert_eq!(detail.topics.len(), 2);
    assert_eq!(detail.topics[0].title, "Basics");
    assert_eq!(detail.topics[0].chapters.len(), 1);
    assert_eq!(detail.topics[0].chapters[0].id, variables);
    assert!(detail.topics[1].is_virtual);
    assert_eq!(detail.topics[1].chapters[0].id, appendix);

    let view = query
        .chapter_view("john", &course_id, &variables, OffsetDateTime::now_utc())
        .await?;
    assert_eq!(view.next_chapter_id.as_deref(), Some(appendix.as_str()));

    Ok(())
}

#[tokio::test]
async fn chapter_view_exposes_the_completion_gate() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, query) = helpers::setup(&state);
    let (course_id, chapters) = helpers::create_published_course(&cmd, "Rust 101", None, 2).await?;

    cmd.update_chapter(
        &helpers::teacher(),
        &course_id,
        &chapters[0],
        UpdateChapterInput {
            pdf_url: Some(Some("https://files.pensum.localhost/notes.pdf".to_owned())),
            google_form_url: Some(Some("https://forms.pensum.localhost/quiz".to_owned())),
            ..Default::default()
        },
    )
    .await?;

    let view = query
        .chapter_view("john", &course_id, &chapters[0], OffsetDateTime::now_utc())
        .await?;
    assert_eq!(view.gate, CompletionGate::PendingBoth);
    assert_eq!(view.outstanding, vec![Resource::Pdf, Resource::Form]);

    let view = query
        .chapter_view("john", &course_id, &chapters[1], OffsetDateTime::now_utc())
        .await?;
    assert_eq!(view.gate, CompletionGate::Ready);
    assert!(view.outstanding.is_empty());
    assert_eq!(view.next_chapter_id, None);

    Ok(())
}

#[tokio::test]
async fn progress_counts_only_chapters_students_can_see() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, query) = helpers::setup(&state);
    let course_id = helpers::create_course(&cmd, "Rust 101", None).await?;

    let basics = cmd
        .create_topic(
            &helpers::teacher(),
            &course_id,
            TopicInput {
                title: "Basics".to_owned(),
            },
        )
        .await?;
    let advanced = cmd
        .create_topic(
            &helpers::teacher(),
            &course_id,
            TopicInput {
                title: "Advanced".to_owned(),
            },
        )
        .await?;
    cmd.publish_topic(&helpers::teacher(), &course_id, &basics)
        .await?;

    let variables =
        helpers::create_chapter(&cmd, &course_id, "Variables", Some(&basics), true).await?;
    let hidden = helpers::create_chapter(&cmd, &course_id, "Unsafe", Some(&advanced), true).await?;
    cmd.publish_course(&helpers::teacher(), &course_id).await?;
    let now = OffsetDateTime::now_utc();

    let progress = query
        .set_chapter_completion("john", &course_id, &variables, true, now)
        .await?;
    assert_eq!(progress, 100);

    let detail = query.course_detail("john", &course_id, now).await?;
    assert_eq!(detail.progress, 100);
    assert_eq!(query.progress().get_progress("john", &course_id).await?, 100);

    let courses = query.catalog("john", CatalogFilter::default()).await?;
    assert_eq!(courses[0].chapter_count, 1);
    assert_eq!(courses[0].progress, Some(100));

    let err = query
        .set_chapter_completion("john", &course_id, &hidden, true, now)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound("chapter")));

    Ok(())
}

#[tokio::test]
async fn course_with_only_hidden_topics_still_has_one_topic() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, query) = helpers::setup(&state);
    let (course_id, chapters) =
        helpers::create_published_course(&cmd, "Rust 101", None, 1).await?;

    let draft = cmd
        .create_topic(
            &helpers::teacher(),
            &course_id,
            TopicInput {
                title: "Draft".to_owned(),
            },
        )
        .await?;
    cmd.update_chapter(
        &helpers::teacher(),
        &course_id,
        &chapters[0],
        UpdateChapterInput {
            topic_id: Some(Some(draft)),
            ..Default::default()
        },
    )
    .await?;

    let detail = query
        .course_detail("john", &course_id, OffsetDateTime::now_utc())
        .await?;
    assert_eq!(detail.topics.len(), 1);
    assert!(detail.topics[0].is_virtual);
    assert_eq!(detail.topics[0].title, "Rust 101");
    assert!(detail.topics[0].chapters.is_empty());
    assert_eq!(detail.progress, 0);

    Ok(())
}
