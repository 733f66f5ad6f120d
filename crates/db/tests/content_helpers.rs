//! Integration tests for the database-backed content helpers.
//!
//! Builds a small zoned wiki:
//! - ZoneRoot (zone) -> SubPage -> SubSubPage
//! - OtherPage, outside any zone

use assert_matches::assert_matches;
use sqlx::PgPool;
use wiki_core::error::CoreError;
use wiki_core::revision_diff::DIFF_UNAVAILABLE;
use wiki_core::zone_links::ZoneLinkConfig;
use wiki_db::error::HelperError;
use wiki_db::helpers::{
    document_zone_management_links, load_ancestor_chain, revisions_unified_diff,
    zone_section_extract,
};
use wiki_db::models::document::{CreateDocument, Document};
use wiki_db::models::revision::CreateRevision;
use wiki_db::models::user::{CreateUser, User};
use wiki_db::repositories::{DocumentRepo, DocumentZoneRepo, RevisionRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const LINKS_HTML: &str = r#"<h4 id="links">Links</h4><p>Links content</p>"#;
const SUB_LINKS_HTML: &str = r#"<h4 id="links">Links</h4><p>Sub-page links content</p>"#;

async fn new_document(pool: &PgPool, slug: &str, parent: Option<i64>, html: &str) -> Document {
    DocumentRepo::create(
        pool,
        &CreateDocument {
            locale: None,
            slug: slug.to_string(),
            title: slug.to_string(),
            parent_topic_id: parent,
            rendered_html: Some(html.to_string()),
        },
    )
    .await
    .unwrap()
}

async fn new_user(pool: &PgPool, username: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role: Some(role.to_string()),
            is_superuser: None,
        },
    )
    .await
    .unwrap()
}

struct Wiki {
    root: Document,
    sub: Document,
    sub_sub: Document,
    other: Document,
    zone_id: i64,
}

async fn seed_wiki(pool: &PgPool) -> Wiki {
    let root = new_document(pool, "ZoneRoot", None, LINKS_HTML).await;
    let sub = new_document(pool, "ZoneRoot/SubPage", Some(root.id), "This is a subpage").await;
    let sub_sub = new_document(
        pool,
        "ZoneRoot/SubPage/SubSubPage",
        Some(sub.id),
        SUB_LINKS_HTML,
    )
    .await;
    let other = new_document(pool, "OtherPage", None, "This is an other page").await;
    let zone = DocumentZoneRepo::create(pool, root.id).await.unwrap();
    Wiki {
        root,
        sub,
        sub_sub,
        other,
        zone_id: zone.id,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeded_tree_is_queryable(pool: PgPool) {
    let wiki = seed_wiki(&pool).await;

    let found = DocumentRepo::find_by_slug(&pool, "en-US", "ZoneRoot/SubPage")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, wiki.sub.id);

    let children = DocumentRepo::list_children(&pool, wiki.sub.id).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, wiki.sub_sub.id);

    let zone = DocumentZoneRepo::find_by_document(&pool, wiki.root.id).await.unwrap();
    assert_eq!(zone.map(|z| z.id), Some(wiki.zone_id));
    let zone = DocumentZoneRepo::find_by_id(&pool, wiki.zone_id).await.unwrap().unwrap();
    assert_eq!(zone.document_id, wiki.root.id);
    assert!(DocumentZoneRepo::find_by_document(&pool, wiki.sub.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_zone_on_document_is_rejected(pool: PgPool) {
    let wiki = seed_wiki(&pool).await;
    let result = DocumentZoneRepo::create(&pool, wiki.root.id).await;
    assert_matches!(result, Err(sqlx::Error::Database(_)));
}

// ---------------------------------------------------------------------------
// Zone sections
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn zone_section_cascades_down_the_tree(pool: PgPool) {
    let wiki = seed_wiki(&pool).await;

    let root = zone_section_extract(&pool, wiki.root.id, "links").await.unwrap();
    let sub = zone_section_extract(&pool, wiki.sub.id, "links").await.unwrap();
    let sub_sub = zone_section_extract(&pool, wiki.sub_sub.id, "links").await.unwrap();
    let other = zone_section_extract(&pool, wiki.other.id, "links").await.unwrap();

    assert_eq!(root.as_deref(), Some("<p>Links content</p>"));
    assert_eq!(sub.as_deref(), Some("<p>Links content</p>"));
    assert_eq!(sub_sub.as_deref(), Some("<p>Sub-page links content</p>"));
    assert_eq!(other, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn removing_zone_stops_inheritance(pool: PgPool) {
    let wiki = seed_wiki(&pool).await;
    assert!(DocumentZoneRepo::delete_by_document(&pool, wiki.root.id).await.unwrap());

    let sub = zone_section_extract(&pool, wiki.sub.id, "links").await.unwrap();
    assert_eq!(sub, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rerendered_html_is_picked_up(pool: PgPool) {
    let wiki = seed_wiki(&pool).await;
    DocumentRepo::set_rendered_html(
        &pool,
        wiki.root.id,
        r#"<h4 id="links">Links</h4><p>Updated</p>"#,
    )
    .await
    .unwrap()
    .unwrap();

    let sub = zone_section_extract(&pool, wiki.sub.id, "links").await.unwrap();
    assert_eq!(sub.as_deref(), Some("<p>Updated</p>"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_document_is_not_found(pool: PgPool) {
    let err = zone_section_extract(&pool, 999_999, "links").await.unwrap_err();
    assert_matches!(
        err,
        HelperError::Core(CoreError::NotFound { entity: "document", id: 999_999 })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn parent_cycle_is_reported(pool: PgPool) {
    let wiki = seed_wiki(&pool).await;
    DocumentRepo::set_parent_topic(&pool, wiki.root.id, Some(wiki.sub_sub.id))
        .await
        .unwrap()
        .unwrap();

    let err = load_ancestor_chain(&pool, wiki.sub.id).await.unwrap_err();
    assert_matches!(err, HelperError::Core(CoreError::InvalidHierarchy(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ancestor_chain_is_nearest_first(pool: PgPool) {
    let wiki = seed_wiki(&pool).await;
    let chain = load_ancestor_chain(&pool, wiki.sub_sub.id).await.unwrap();
    let ids: Vec<i64> = chain.nodes().iter().map(|n| n.document_id).collect();
    assert_eq!(ids, vec![wiki.sub_sub.id, wiki.sub.id, wiki.root.id]);
    assert_eq!(chain.ancestors()[1].zone_id, Some(wiki.zone_id));
}

// ---------------------------------------------------------------------------
// Zone management links
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn management_links_follow_privileges(pool: PgPool) {
    let wiki = seed_wiki(&pool).await;
    let admin = new_user(&pool, "admin", "admin").await;
    let reader = new_user(&pool, "random", "reader").await;
    let config = ZoneLinkConfig::default();

    let links = document_zone_management_links(&pool, &config, admin.id, wiki.root.id)
        .await
        .unwrap();
    assert!(links.add.is_none());
    assert_eq!(
        links.change.map(|l| l.url),
        Some(format!("/admin/wiki/documentzone/{}/", wiki.zone_id))
    );

    let links = document_zone_management_links(&pool, &config, admin.id, wiki.sub.id)
        .await
        .unwrap();
    assert_eq!(
        links.add.map(|l| l.url),
        Some(format!("/admin/wiki/documentzone/add/?document={}", wiki.sub.id))
    );
    assert!(links.change.is_none());

    let links = document_zone_management_links(&pool, &config, admin.id, wiki.other.id)
        .await
        .unwrap();
    assert!(links.add.is_none() && links.change.is_none());

    for doc in [wiki.root.id, wiki.sub.id, wiki.other.id] {
        let links = document_zone_management_links(&pool, &config, reader.id, doc)
            .await
            .unwrap();
        assert!(links.add.is_none() && links.change.is_none(), "reader on {doc}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_user_is_not_found(pool: PgPool) {
    let wiki = seed_wiki(&pool).await;
    let config = ZoneLinkConfig::default();
    let err = document_zone_management_links(&pool, &config, 999_999, wiki.root.id)
        .await
        .unwrap_err();
    assert_matches!(err, HelperError::Core(CoreError::NotFound { entity: "user", .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_role_is_rejected_by_schema(pool: PgPool) {
    let result = UserRepo::create(
        &pool,
        &CreateUser {
            username: "root".into(),
            email: "root@example.com".into(),
            role: Some("owner".into()),
            is_superuser: None,
        },
    )
    .await;
    assert_matches!(result, Err(sqlx::Error::Database(_)));
}

// ---------------------------------------------------------------------------
// Revision diffs
// ---------------------------------------------------------------------------

fn new_revision(document_id: i64, content: &str) -> CreateRevision {
    CreateRevision {
        document_id,
        title: "Title".into(),
        content: content.into(),
        comment: None,
        creator_id: None,
        is_approved: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn diff_between_stored_revisions(pool: PgPool) {
    let doc = new_document(&pool, "Diffed", None, "").await;
    let first = RevisionRepo::create(&pool, &new_revision(doc.id, "<p>One</p>")).await.unwrap();
    let second = RevisionRepo::create(&pool, &new_revision(doc.id, "<p>Two</p>")).await.unwrap();

    let diff = revisions_unified_diff(&pool, Some(first.id), Some(second.id))
        .await
        .unwrap();
    assert_eq!(
        diff,
        format!(
            "--- [en-US] #{}\n+++ [en-US] #{}\n@@ -1 +1 @@\n-<p>One</p>\n+<p>Two</p>",
            first.id, second.id
        )
    );

    let previous = RevisionRepo::find_previous(&pool, &second).await.unwrap();
    assert_eq!(previous.map(|r| r.id), Some(first.id));

    let current = DocumentRepo::find_by_id(&pool, doc.id).await.unwrap().unwrap();
    assert_eq!(current.current_revision_id, Some(second.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn diff_with_missing_revision_is_unavailable(pool: PgPool) {
    let doc = new_document(&pool, "Lonely", None, "").await;
    let only = RevisionRepo::create(&pool, &new_revision(doc.id, "<p>Only</p>")).await.unwrap();

    let previous = RevisionRepo::find_previous(&pool, &only).await.unwrap();
    assert!(previous.is_none());

    let diff = revisions_unified_diff(&pool, previous.map(|r| r.id), Some(only.id))
        .await
        .unwrap();
    assert_eq!(diff, DIFF_UNAVAILABLE);

    let diff = revisions_unified_diff(&pool, Some(999_999), Some(only.id))
        .await
        .unwrap();
    assert_eq!(diff, DIFF_UNAVAILABLE);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unapproved_revision_does_not_become_current(pool: PgPool) {
    let doc = new_document(&pool, "Drafts", None, "").await;
    let approved = RevisionRepo::create(&pool, &new_revision(doc.id, "a")).await.unwrap();
    let mut draft = new_revision(doc.id, "b");
    draft.is_approved = Some(false);
    RevisionRepo::create(&pool, &draft).await.unwrap();

    let current = DocumentRepo::find_by_id(&pool, doc.id).await.unwrap().unwrap();
    assert_eq!(current.current_revision_id, Some(approved.id));
    assert_eq!(RevisionRepo::list_by_document(&pool, doc.id).await.unwrap().len(), 2);
}
