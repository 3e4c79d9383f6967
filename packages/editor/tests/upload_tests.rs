//! Image upload flow: request, async read, late completion

use anyhow::Result;
use pagecraft_editor::upload::{read_data_uri, UploadError};
use pagecraft_editor::{
    schema, ComponentType, DragPayload, DropOutcome, EditOutcome, EditSession, EditorConfig,
    EditorError, FieldDescriptor, LayoutMap, NodeId, Point, Rect, UploadPolicy,
};
use std::io::Write;

fn image_url_field() -> &'static FieldDescriptor {
    schema::fields_for(ComponentType::Image)
        .into_iter()
        .find(|f| f.label == "Image URL")
        .unwrap()
}

fn drop_component(session: &mut EditSession, ty: ComponentType) -> NodeId {
    let layout = LayoutMap::new().with(
        session.document().root_id(),
        Rect::new(0.0, 0.0, 800.0, 600.0),
    );
    session.start_drag(DragPayload::Component(ty)).unwrap();
    match session.drop(Point::new(5.0, 5.0), &layout) {
        DropOutcome::Inserted(id) => id,
        other => panic!("expected insert, got {other:?}"),
    }
}

fn png_fixture() -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile()?;
    file.write_all(&[0x89, b'P', b'N', b'G'])?;
    Ok(file)
}

#[tokio::test]
async fn test_upload_sets_image_source() -> Result<()> {
    let mut session = EditSession::new();
    let image = drop_component(&mut session, ComponentType::Image);
    session.select(&image);
    let saves = session.history().len();

    let file = png_fixture()?;
    let outcome = session.upload_file(image_url_field(), file.path()).await?;

    assert_eq!(outcome, EditOutcome::Applied);
    let src = session.document().find(&image).unwrap().kind.attribute("src").unwrap();
    assert!(src.starts_with("data:image/png;base64,"));
    assert_eq!(session.history().len(), saves + 1);
    assert!(session.pending_uploads().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_late_upload_applies_after_selection_change_by_default() -> Result<()> {
    let mut session = EditSession::new();
    let image = drop_component(&mut session, ComponentType::Image);
    let other = drop_component(&mut session, ComponentType::Text);
    session.select(&image);

    let ticket = session.begin_upload(image_url_field()).unwrap();
    session.select(&other);

    let file = png_fixture()?;
    let result = read_data_uri(file.path()).await;
    let outcome = session.complete_upload(ticket.id, result)?;

    assert_eq!(outcome, EditOutcome::Applied);
    assert!(session
        .document()
        .find(&image)
        .unwrap()
        .kind
        .attribute("src")
        .unwrap()
        .starts_with("data:"));
    Ok(())
}

#[tokio::test]
async fn test_target_selected_policy_discards_after_selection_change() -> Result<()> {
    let mut session = EditSession::with_config(EditorConfig {
        upload_policy: UploadPolicy::TargetSelected,
        ..EditorConfig::default()
    });
    let image = drop_component(&mut session, ComponentType::Image);
    let other = drop_component(&mut session, ComponentType::Text);
    session.select(&image);
    let before = session.document().snapshot();
    let saves = session.history().len();

    let ticket = session.begin_upload(image_url_field()).unwrap();
    session.select(&other);

    let file = png_fixture()?;
    let outcome = session.complete_upload(ticket.id, read_data_uri(file.path()).await)?;

    assert_eq!(outcome, EditOutcome::Stale);
    assert_eq!(session.document().snapshot(), before);
    assert_eq!(session.history().len(), saves);
    Ok(())
}

#[tokio::test]
async fn test_upload_discarded_when_target_undone_away() -> Result<()> {
    let mut session = EditSession::new();
    let image = drop_component(&mut session, ComponentType::Image);
    session.select(&image);

    let ticket = session.begin_upload(image_url_field()).unwrap();
    session.undo();
    assert!(!session.document().contains(&image));
    assert!(session.pending_uploads().is_empty());

    let file = png_fixture()?;
    let outcome = session.complete_upload(ticket.id, read_data_uri(file.path()).await)?;
    assert_eq!(outcome, EditOutcome::Stale);
    assert!(session.can_redo());
    Ok(())
}

#[tokio::test]
async fn test_slide_image_upload() -> Result<()> {
    let mut session = EditSession::new();
    let carousel = drop_component(&mut session, ComponentType::Carousel);
    session.select(&carousel);
    session.select_slide(0)?;

    let file = png_fixture()?;
    let outcome = session
        .upload_file(schema::slide_image_field(), file.path())
        .await?;
    assert_eq!(outcome, EditOutcome::Applied);

    let slide = &session.document().find(&carousel).unwrap().children[0];
    assert!(slide.kind.attribute("src").unwrap().starts_with("data:image/png"));
    Ok(())
}

#[tokio::test]
async fn test_failed_read_leaves_document_alone() -> Result<()> {
    let mut session = EditSession::new();
    let image = drop_component(&mut session, ComponentType::Image);
    session.select(&image);
    let saves = session.history().len();

    let dir = tempfile::tempdir()?;
    let result = session
        .upload_file(image_url_field(), dir.path().join("nope.png"))
        .await;

    assert!(result.is_err());
    assert_eq!(session.history().len(), saves);
    assert!(session.pending_uploads().is_empty());
    Ok(())
}

#[test]
fn test_removing_target_forgets_pending_ticket() {
    let mut session = EditSession::new();
    let image = drop_component(&mut session, ComponentType::Image);
    let other = drop_component(&mut session, ComponentType::Image);
    session.select(&image);
    let gone = session.begin_upload(image_url_field()).unwrap();
    session.select(&other);
    let kept = session.begin_upload(image_url_field()).unwrap();
    assert_eq!(session.pending_uploads().len(), 2);

    session.remove_node(&image).unwrap();

    let pending: Vec<_> = session.pending_uploads().iter().map(|t| t.id).collect();
    assert_eq!(pending, vec![kept.id]);
    let outcome = session
        .complete_upload(gone.id, Ok("data:image/png;base64,AA==".to_string()))
        .unwrap();
    assert_eq!(outcome, EditOutcome::Stale);
}

#[test]
fn test_never_issued_ticket_is_unknown() {
    let mut session = EditSession::new();
    let result = session.complete_upload(42, Ok("data:,".to_string()));
    assert!(matches!(
        result,
        Err(EditorError::Upload(UploadError::UnknownTicket(42)))
    ));
}

#[test]
fn test_non_file_fields_do_not_start_uploads() {
    let mut session = EditSession::new();
    let text = drop_component(&mut session, ComponentType::Text);
    session.select(&text);

    let content = schema::fields_for(ComponentType::Text)
        .into_iter()
        .find(|f| f.label == "Content")
        .unwrap();
    assert!(session.begin_upload(content).is_none());
    assert!(session.begin_upload(image_url_field()).is_none());
}
