//! Edit URL integration tests
//!
//! Resolve edit links for values of a full query response the way an overlay would: by walking
//! the result and asking for the edit URL of each leaf.

mod common;

use common::*;
use content_source_map::{
    config::{ConfigProvider, TomlConfigProvider},
    edit::{
        create_edit_url, resolve_edit_info, resolve_edit_url, EditInfo, StudioBaseRoute, StudioUrl,
    },
    paths::{parse_expression, to_expression, KeyedSegment, PathSegment},
    walk::walk_portable_text,
};
use std::collections::BTreeMap;
use tempfile::TempDir;

const STUDIO: &str = "https://blog.sanity.studio";

#[test]
fn test_draft_document_links_with_draft_marker() {
    init_logging();
    let csm = blog_post_source_map();
    let url = resolve_edit_url(&csm, "title", STUDIO).unwrap().unwrap();
    assert_eq!(
        url,
        format!(
            "https://blog.sanity.studio/intent/edit/mode=presentation;id={POST_ID};type=post;path=title\
             ?baseUrl=https%3A%2F%2Fblog.sanity.studio&id={POST_ID}&type=post&path=title&isDraft="
        )
    );
    assert!(!url.contains("perspective="));
}

#[test]
fn test_published_document_links_with_published_perspective() {
    init_logging();
    let csm = blog_post_source_map();
    let url = resolve_edit_url(&csm, "authorName", STUDIO).unwrap().unwrap();
    assert!(url.contains(";id=author-ada;type=person;path=name?"));
    assert!(url.ends_with("&perspective=published"));
}

#[test]
fn test_version_document_links_with_release_perspective() {
    let info = EditInfo {
        base_url: STUDIO.to_string(),
        id: format!("versions.rSpring.{POST_ID}"),
        doc_type: "post".to_string(),
        path: vec!["title".into()],
        ..Default::default()
    };
    let url = create_edit_url(&info).unwrap();
    assert!(url.contains(&format!(";id={POST_ID};")));
    assert!(url.ends_with("&perspective=rSpring"));
}

#[test]
fn test_nested_field_under_prefix_mapping() {
    init_logging();
    let csm = blog_post_source_map();
    let info = resolve_edit_info(
        &csm,
        &[PathSegment::from("slug")],
        &StudioUrl::Route(StudioBaseRoute {
            base_url: "/admin".to_string(),
            workspace: Some("blog".to_string()),
            tool: Some("structure".to_string()),
        }),
    )
    .unwrap();
    assert_eq!(to_expression(&info.path), "$['slug']['current']");
    let url = create_edit_url(&info).unwrap();
    assert!(url.starts_with(
        "/admin/blog/intent/edit/mode=presentation;id=807cc05c-8c4c-443a-a5cc-e5bd4c9d7c8b;\
         type=post;path=slug.current;tool=structure?"
    ));
    assert!(url.contains("&workspace=blog&tool=structure&isDraft="));
}

#[test]
fn test_walked_portable_text_leaves() {
    init_logging();
    let csm = blog_post_source_map();
    let mut urls = BTreeMap::new();
    walk_portable_text(&blog_post_result(), |value, path| {
        if let Some(info) = resolve_edit_info(&csm, path, STUDIO) {
            urls.insert(to_expression(path), create_edit_url(&info).unwrap());
        }
        value.clone()
    });
    assert_eq!(urls.len(), 4);
    let span = &urls["$['content'][?(@._key=='b1')]['children'][?(@._key=='s1')]['text']"];
    assert!(span.contains(";path=content%5B0%5D.children%5B0%5D.text?"));
}

#[test]
fn test_studio_url_from_config() {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("csm.toml");
    std::fs::write(
        &config_path,
        "[studio_url]\nbaseUrl = \"https://blog.sanity.studio/\"\nworkspace = \"default\"\n",
    )
    .unwrap();
    let config = TomlConfigProvider::new(&config_path).get_config().unwrap();
    let studio = config.studio_url.unwrap();

    let csm = blog_post_source_map();
    let from_config = resolve_edit_url(&csm, "title", &studio).unwrap().unwrap();
    let direct = resolve_edit_url(&csm, "title", STUDIO).unwrap().unwrap();
    assert_eq!(from_config, direct);
}

#[test]
fn test_mapping_key_scenarios() {
    assert_eq!(
        to_expression(&[
            PathSegment::from("foo"),
            "bar".into(),
            0.into(),
            "baz".into()
        ]),
        "$['foo']['bar'][0]['baz']"
    );
    assert_eq!(
        parse_expression("$['foo'][?(@._key=='section-1')][0]"),
        vec![
            PathSegment::from("foo"),
            KeyedSegment::new("section-1").into(),
            0.into()
        ]
    );
}
