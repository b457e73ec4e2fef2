//! Wiki fixtures shared by the purge tests.

use bytes::Bytes;
use expunge_core::config::{BootstrapLayout, SchemaBootstrap};
use expunge_storage::{ArtifactStore, FileLayout};

/// Every table the multi-unit schema creates, for before/after snapshots.
#[allow(dead_code)]
pub const SLOTS_TABLES: &[&str] = &[
    "archive",
    "category",
    "categorylinks",
    "content",
    "externallinks",
    "filearchive",
    "image",
    "imagelinks",
    "langlinks",
    "logging",
    "oldimage",
    "page",
    "page_restrictions",
    "pagelinks",
    "recentchanges",
    "redirect",
    "revision",
    "searchindex",
    "slots",
    "templatelinks",
    "text",
    "watchlist",
];

#[allow(dead_code)]
pub fn legacy_bootstrap() -> SchemaBootstrap {
    SchemaBootstrap {
        layout: BootstrapLayout::Legacy,
        search_index: false,
    }
}

#[allow(dead_code)]
pub fn slots_without_search_index() -> SchemaBootstrap {
    SchemaBootstrap {
        layout: BootstrapLayout::Slots,
        search_index: false,
    }
}

/// `Foo` (id 1) with three revisions, one archived revision, one category,
/// two outgoing links and entries in every dependent table. `Bar` (id 2)
/// links to `Foo` and shares its category; `Talk:Foo` (id 3) is its talk
/// page. Content uses the multi-unit layout.
#[allow(dead_code)]
pub const FOO_WIKI: &str = r#"
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (1, 0, 'Foo', FALSE, 3);
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (2, 0, 'Bar', FALSE, 5);
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (3, 1, 'Foo', FALSE, 6);
INSERT INTO revision (rev_id, rev_page, rev_timestamp) VALUES (1, 1, '20240101000000');
INSERT INTO revision (rev_id, rev_page, rev_timestamp) VALUES (2, 1, '20240102000000');
INSERT INTO revision (rev_id, rev_page, rev_timestamp) VALUES (3, 1, '20240103000000');
INSERT INTO revision (rev_id, rev_page, rev_timestamp) VALUES (5, 2, '20240105000000');
INSERT INTO revision (rev_id, rev_page, rev_timestamp) VALUES (6, 3, '20240106000000');
INSERT INTO archive (ar_namespace, ar_title, ar_rev_id, ar_timestamp) VALUES (0, 'Foo', 4, '20231201000000');
INSERT INTO text (old_id, old_text) VALUES (1, 'foo one');
INSERT INTO text (old_id, old_text) VALUES (2, 'foo two');
INSERT INTO text (old_id, old_text) VALUES (3, 'foo three');
INSERT INTO text (old_id, old_text) VALUES (4, 'foo archived');
INSERT INTO text (old_id, old_text) VALUES (5, 'bar');
INSERT INTO text (old_id, old_text) VALUES (6, 'talk');
INSERT INTO content (content_id, content_address) VALUES (1, 'tt:1');
INSERT INTO content (content_id, content_address) VALUES (2, 'tt:2');
INSERT INTO content (content_id, content_address) VALUES (3, 'tt:3');
INSERT INTO content (content_id, content_address) VALUES (4, 'tt:4');
INSERT INTO content (content_id, content_address) VALUES (5, 'tt:5');
INSERT INTO content (content_id, content_address) VALUES (6, 'tt:6');
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (1, 1, 1, 1);
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (2, 1, 2, 2);
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (3, 1, 3, 3);
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (4, 1, 4, 4);
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (5, 1, 5, 5);
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (6, 1, 6, 6);
INSERT INTO category (cat_title, cat_pages, cat_subcats, cat_files) VALUES ('Fruit', 2, 0, 0);
INSERT INTO categorylinks (cl_from, cl_to, cl_type) VALUES (1, 'Fruit', 'page');
INSERT INTO categorylinks (cl_from, cl_to, cl_type) VALUES (2, 'Fruit', 'page');
INSERT INTO pagelinks (pl_from, pl_namespace, pl_title) VALUES (1, 0, 'Bar');
INSERT INTO pagelinks (pl_from, pl_namespace, pl_title) VALUES (1, 0, 'Baz');
INSERT INTO pagelinks (pl_from, pl_namespace, pl_title) VALUES (2, 0, 'Foo');
INSERT INTO externallinks (el_from, el_to) VALUES (1, 'https://example.org/foo');
INSERT INTO langlinks (ll_from, ll_lang, ll_title) VALUES (1, 'de', 'Foo');
INSERT INTO page_restrictions (pr_page, pr_type, pr_level) VALUES (1, 'edit', 'sysop');
INSERT INTO templatelinks (tl_from, tl_namespace, tl_title) VALUES (1, 10, 'Infobox');
INSERT INTO imagelinks (il_from, il_to) VALUES (1, 'Logo.png');
INSERT INTO recentchanges (rc_namespace, rc_title, rc_this_oldid) VALUES (0, 'Foo', 2);
INSERT INTO recentchanges (rc_namespace, rc_title, rc_this_oldid) VALUES (0, 'Foo', 3);
INSERT INTO recentchanges (rc_namespace, rc_title, rc_this_oldid) VALUES (0, 'Bar', 5);
INSERT INTO recentchanges (rc_namespace, rc_title, rc_this_oldid) VALUES (1, 'Foo', 6);
INSERT INTO logging (log_type, log_action, log_namespace, log_title) VALUES ('create', 'create', 0, 'Foo');
INSERT INTO logging (log_type, log_action, log_namespace, log_title) VALUES ('create', 'create', 0, 'Bar');
INSERT INTO watchlist (wl_user, wl_namespace, wl_title) VALUES (1, 0, 'Foo');
INSERT INTO watchlist (wl_user, wl_namespace, wl_title) VALUES (1, 1, 'Foo');
INSERT INTO watchlist (wl_user, wl_namespace, wl_title) VALUES (1, 0, 'Bar')
"#;

/// Search index rows for [`FOO_WIKI`]; requires the `searchindex` table.
#[allow(dead_code)]
pub const FOO_SEARCH_INDEX: &str = r#"
INSERT INTO searchindex (si_page, si_title, si_text) VALUES (1, 'foo', 'foo three');
INSERT INTO searchindex (si_page, si_title, si_text) VALUES (2, 'bar', 'bar')
"#;

/// [`FOO_WIKI`] on the legacy layout: revisions point at text rows directly.
#[allow(dead_code)]
pub const FOO_LEGACY_WIKI: &str = r#"
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (1, 0, 'Foo', FALSE, 3);
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (2, 0, 'Bar', FALSE, 5);
INSERT INTO revision (rev_id, rev_page, rev_text_id) VALUES (1, 1, 1);
INSERT INTO revision (rev_id, rev_page, rev_text_id) VALUES (2, 1, 2);
INSERT INTO revision (rev_id, rev_page, rev_text_id) VALUES (3, 1, 3);
INSERT INTO revision (rev_id, rev_page, rev_text_id) VALUES (5, 2, 5);
INSERT INTO archive (ar_namespace, ar_title, ar_rev_id, ar_text_id) VALUES (0, 'Foo', 4, 4);
INSERT INTO archive (ar_namespace, ar_title, ar_rev_id, ar_text_id) VALUES (0, 'Foo', 7, 0);
INSERT INTO text (old_id, old_text) VALUES (1, 'foo one');
INSERT INTO text (old_id, old_text) VALUES (2, 'foo two');
INSERT INTO text (old_id, old_text) VALUES (3, 'foo three');
INSERT INTO text (old_id, old_text) VALUES (4, 'foo archived');
INSERT INTO text (old_id, old_text) VALUES (5, 'bar');
INSERT INTO category (cat_title, cat_pages, cat_subcats, cat_files) VALUES ('Fruit', 2, 0, 0);
INSERT INTO categorylinks (cl_from, cl_to, cl_type) VALUES (1, 'Fruit', 'page');
INSERT INTO categorylinks (cl_from, cl_to, cl_type) VALUES (2, 'Fruit', 'page');
INSERT INTO pagelinks (pl_from, pl_namespace, pl_title) VALUES (1, 0, 'Bar');
INSERT INTO watchlist (wl_user, wl_namespace, wl_title) VALUES (1, 0, 'Foo');
INSERT INTO watchlist (wl_user, wl_namespace, wl_title) VALUES (1, 1, 'Foo')
"#;

/// Two pages whose latest revisions share one content unit.
#[allow(dead_code)]
pub const SHARED_CONTENT_WIKI: &str = r#"
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (10, 0, 'Alpha', FALSE, 10);
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (11, 0, 'Beta', FALSE, 11);
INSERT INTO revision (rev_id, rev_page) VALUES (10, 10);
INSERT INTO revision (rev_id, rev_page) VALUES (11, 11);
INSERT INTO text (old_id, old_text) VALUES (10, 'identical body');
INSERT INTO content (content_id, content_address) VALUES (10, 'tt:10');
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (10, 1, 10, 10);
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (11, 1, 10, 10)
"#;

/// `Gamma` (id 30): one revision whose main and auxiliary slots point at the
/// same content unit.
#[allow(dead_code)]
pub const MULTI_ROLE_WIKI: &str = r#"
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (30, 0, 'Gamma', FALSE, 30);
INSERT INTO revision (rev_id, rev_page) VALUES (30, 30);
INSERT INTO text (old_id, old_text) VALUES (30, 'gamma');
INSERT INTO content (content_id, content_address) VALUES (30, 'tt:30');
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (30, 1, 30, 30);
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (30, 2, 30, 30)
"#;

/// `Delta` (id 40): revision 42 reverts to the content of revision 40.
#[allow(dead_code)]
pub const REVERTED_WIKI: &str = r#"
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (40, 0, 'Delta', FALSE, 42);
INSERT INTO revision (rev_id, rev_page) VALUES (40, 40);
INSERT INTO revision (rev_id, rev_page) VALUES (41, 40);
INSERT INTO revision (rev_id, rev_page) VALUES (42, 40);
INSERT INTO text (old_id, old_text) VALUES (40, 'delta');
INSERT INTO text (old_id, old_text) VALUES (41, 'vandalism');
INSERT INTO content (content_id, content_address) VALUES (40, 'tt:40');
INSERT INTO content (content_id, content_address) VALUES (41, 'tt:41');
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (40, 1, 40, 40);
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (41, 1, 41, 41);
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (42, 1, 40, 40)
"#;

/// `File:Logo.png` (id 20) with a current version, two superseded versions
/// and two soft-deleted versions, one of which has no stored file.
#[allow(dead_code)]
pub const LOGO_FILE_WIKI: &str = r#"
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (20, 6, 'Logo.png', FALSE, 20);
INSERT INTO page (page_id, page_namespace, page_title, page_is_redirect, page_latest) VALUES (21, 0, 'Gallery', FALSE, 21);
INSERT INTO revision (rev_id, rev_page) VALUES (20, 20);
INSERT INTO revision (rev_id, rev_page) VALUES (21, 21);
INSERT INTO text (old_id, old_text) VALUES (20, 'logo description');
INSERT INTO text (old_id, old_text) VALUES (21, '[[File:Logo.png]]');
INSERT INTO content (content_id, content_address) VALUES (20, 'tt:20');
INSERT INTO content (content_id, content_address) VALUES (21, 'tt:21');
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (20, 1, 20, 20);
INSERT INTO slots (slot_revision_id, slot_role_id, slot_content_id, slot_origin) VALUES (21, 1, 21, 21);
INSERT INTO category (cat_title, cat_pages, cat_subcats, cat_files) VALUES ('Images', 1, 0, 1);
INSERT INTO categorylinks (cl_from, cl_to, cl_type) VALUES (20, 'Images', 'file');
INSERT INTO imagelinks (il_from, il_to) VALUES (21, 'Logo.png');
INSERT INTO image (img_name, img_size, img_sha1) VALUES ('Logo.png', 1024, 'abc');
INSERT INTO oldimage (oi_name, oi_archive_name, oi_timestamp) VALUES ('Logo.png', '20240101000000!Logo.png', '20240101000000');
INSERT INTO oldimage (oi_name, oi_archive_name, oi_timestamp) VALUES ('Logo.png', '20240201000000!Logo.png', '20240201000000');
INSERT INTO filearchive (fa_name, fa_storage_key) VALUES ('Logo.png', 'f00dbabe.png');
INSERT INTO filearchive (fa_name, fa_storage_key) VALUES ('Logo.png', NULL)
"#;

/// Keys written for one file by [`populate_file`].
#[allow(dead_code)]
pub struct FileFixture {
    pub current: String,
    pub archived: Vec<String>,
    pub thumbs: Vec<String>,
    pub deleted: String,
}

impl FileFixture {
    #[allow(dead_code)]
    pub fn all_keys(&self) -> Vec<String> {
        std::iter::once(self.current.clone())
            .chain(self.archived.iter().cloned())
            .chain(self.thumbs.iter().cloned())
            .chain(std::iter::once(self.deleted.clone()))
            .collect()
    }
}

/// Write the artifacts matching [`LOGO_FILE_WIKI`]'s rows for `name`.
#[allow(dead_code)]
pub async fn populate_file(
    store: &dyn ArtifactStore,
    layout: &FileLayout,
    name: &str,
) -> FileFixture {
    let current = layout.current_key(name);
    let archived: Vec<String> = ["20240101000000", "20240201000000"]
        .iter()
        .map(|ts| layout.archive_key(name, &format!("{ts}!{name}")))
        .collect();
    let thumb_prefix = layout.thumb_prefix(name);
    let thumbs: Vec<String> = [120, 240]
        .iter()
        .map(|px| format!("{thumb_prefix}/{px}px-{name}"))
        .collect();
    let deleted = layout.deleted_key("f00dbabe.png");

    let fixture = FileFixture {
        current,
        archived,
        thumbs,
        deleted,
    };
    for key in fixture.all_keys() {
        store
            .put(&key, Bytes::from(format!("artifact:{key}")))
            .await
            .expect("Failed to write fixture artifact");
    }
    fixture
}
