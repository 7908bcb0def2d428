use crate::document::{Document, ImageAttrs};
use crate::gesture::{HitTarget, InputEvent, Key, MouseButton};
use crate::listeners::ListenerKind;
use crate::overlay::{class, Action};
use crate::registry::ImageItem;
use crate::settings::{GallerySettings, Scope, ViewerConfig};
use crate::{create, Viewer};
use egui::Pos2;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn page(sources: &[&str]) -> (Document, crate::NodeId) {
    let doc = Document::new();
    let gallery = doc.create_container(Some("gallery"));
    doc.append(doc.body(), gallery);
    for src in sources {
        let img = doc.create_image(ImageAttrs::new(*src).with_alt(format!("alt {src}")));
        doc.append(gallery, img);
    }
    (doc, gallery)
}

fn sources(viewer: &Viewer) -> Vec<String> {
    viewer.registry().iter().map(|i| i.source.clone()).collect()
}

fn finish(viewer: &mut Viewer) {
    viewer.tick(Instant::now() + Duration::from_secs(10));
}

#[test]
fn test_explicit_list_navigation() {
    let doc = Document::new();
    let images = vec![ImageItem::new("a.jpg"), ImageItem::new("b.jpg"), ImageItem::new("c.jpg")];
    let mut viewer = create(ViewerConfig::new().with_images(images), &doc);

    viewer.open(1);
    let overlay = viewer.overlay().unwrap();
    assert_eq!(overlay.image.as_ref().unwrap().source, "b.jpg");
    assert_eq!(overlay.counter, "2 / 3");

    viewer.next();
    assert_eq!(viewer.overlay().unwrap().image.as_ref().unwrap().source, "c.jpg");
    assert_eq!(viewer.overlay().unwrap().counter, "3 / 3");

    // No wraparound
    viewer.next();
    assert_eq!(viewer.index(), Some(2));

    // Explicit lists never watch the document
    assert_eq!(doc.watcher_count(), 0);
}

#[test]
fn test_images_added_later_are_picked_up() {
    let (doc, gallery) = page(&[]);
    let mut viewer = create(ViewerConfig::new().with_scope(Scope::Selector("#gallery".into())), &doc);
    assert!(viewer.is_empty());

    let img = doc.create_image(ImageAttrs::new("late.jpg"));
    doc.append(gallery, img);
    viewer.sync();
    assert_eq!(sources(&viewer), vec!["late.jpg"]);

    assert!(viewer.handle_element_click(img));
    assert!(viewer.is_open());
}

#[test]
fn test_nested_insertions_are_found() {
    let (doc, gallery) = page(&["a.jpg"]);
    let mut viewer = create(ViewerConfig::new().with_scope(Scope::Element(gallery)), &doc);

    let card = doc.create_container(None);
    let inner = doc.create_image(ImageAttrs::new("nested.jpg"));
    doc.append(card, inner);
    doc.append(gallery, card);

    // Outside the scope
    let stray = doc.create_image(ImageAttrs::new("elsewhere.jpg"));
    doc.append(doc.body(), stray);

    viewer.sync();
    assert_eq!(sources(&viewer), vec!["a.jpg", "nested.jpg"]);
}

#[test]
fn test_scope_container_off_page_is_tracked() {
    let doc = Document::new();
    let container = doc.create_container(None);
    let mut viewer = create(ViewerConfig::new().with_scope(Scope::Element(container)), &doc);
    assert!(viewer.is_empty());

    let img = doc.create_image(ImageAttrs::new("fresh.jpg"));
    doc.append(container, img);
    viewer.sync();
    assert_eq!(sources(&viewer), vec!["fresh.jpg"]);

    doc.remove(img);
    viewer.sync();
    assert!(viewer.is_empty());
}

#[test]
fn test_unmatched_selector_scans_body() {
    let (doc, _) = page(&["a.jpg", "b.jpg"]);
    let viewer = create(ViewerConfig::new().with_scope(Scope::Selector("#missing".into())), &doc);
    assert_eq!(viewer.len(), 2);
}

#[test]
fn test_opt_out_and_filter() {
    let doc = Document::new();
    for attrs in [
        ImageAttrs::new("keep.jpg"),
        ImageAttrs::new("skip.jpg").no_viewer(),
        ImageAttrs::new("icon.svg"),
        ImageAttrs::new("").with_current_src("picked.webp"),
    ] {
        let img = doc.create_image(attrs);
        doc.append(doc.body(), img);
    }
    let viewer = create(
        ViewerConfig::new().with_filter(|el| !el.attrs.src.ends_with(".svg")),
        &doc,
    );
    assert_eq!(sources(&viewer), vec!["keep.jpg", "picked.webp"]);
}

#[test]
fn test_element_click_uses_current_position() {
    let (doc, gallery) = page(&["a.jpg", "b.jpg", "c.jpg"]);
    let mut viewer = create(ViewerConfig::new(), &doc);
    let elements = doc.images_under(gallery);

    doc.remove(elements[0].id);
    viewer.sync();

    assert!(viewer.handle_element_click(elements[2].id));
    assert_eq!(viewer.index(), Some(1));
    assert_eq!(viewer.current_item().unwrap().source, "c.jpg");

    // Removed elements no longer open anything
    viewer.close();
    finish(&mut viewer);
    assert!(!viewer.handle_element_click(elements[0].id));
}

#[test]
fn test_live_changes_while_open_update_strip_and_counter() {
    let (doc, gallery) = page(&["a.jpg", "b.jpg", "c.jpg"]);
    let mut viewer = create(ViewerConfig::new(), &doc);
    let elements = doc.images_under(gallery);
    viewer.open(2);

    let extra = doc.create_image(ImageAttrs::new("d.jpg"));
    doc.append(gallery, extra);
    viewer.sync();
    let overlay = viewer.overlay().unwrap();
    assert_eq!(overlay.counter, "3 / 4");
    assert_eq!(overlay.thumbs.as_ref().unwrap().len(), 4);

    doc.remove(elements[0].id);
    viewer.sync();
    let overlay = viewer.overlay().unwrap();
    let thumbs: Vec<_> = overlay.thumbs.as_ref().unwrap().iter().map(|t| t.source.clone()).collect();
    assert_eq!(thumbs, vec!["b.jpg", "c.jpg", "d.jpg"]);
    // The shown item and index stay put until the user navigates
    assert_eq!(viewer.index(), Some(2));
    assert_eq!(overlay.image.as_ref().unwrap().source, "c.jpg");
    assert_eq!(overlay.counter, "3 / 3");
}

#[test]
fn test_thumbnail_selection_navigates() {
    let (doc, _) = page(&["a.jpg", "b.jpg", "c.jpg"]);
    let mut viewer = create(ViewerConfig::new(), &doc);
    viewer.open(0);
    viewer.select_thumbnail(2);
    assert_eq!(viewer.current_item().unwrap().source, "c.jpg");
    assert!(viewer.overlay().unwrap().thumbs.as_ref().unwrap().is_active(2));
}

#[test]
fn test_no_thumbnails_when_disabled() {
    let (doc, _) = page(&["a.jpg"]);
    let settings = GallerySettings {
        show_thumbnails: false,
        ..Default::default()
    };
    let mut viewer = create(ViewerConfig::new().with_settings(settings), &doc);
    viewer.open(0);
    assert!(viewer.overlay().unwrap().thumbs.is_none());
}

#[test]
fn test_listeners_follow_lifecycle() {
    let (doc, _) = page(&["a.jpg", "b.jpg"]);
    let mut viewer = create(ViewerConfig::new(), &doc);
    assert_eq!(viewer.listeners().active(), vec![ListenerKind::MutationWatch]);

    viewer.open(0);
    assert!(viewer.listeners().is_active(ListenerKind::Keyboard));
    assert!(viewer.listeners().is_active(ListenerKind::StageWheel));
    assert!(viewer.listeners().is_active(ListenerKind::Backdrop));

    viewer.close();
    // Keys stop at once; the rest goes with the overlay
    assert!(!viewer.listeners().is_active(ListenerKind::Keyboard));
    assert!(viewer.listeners().is_active(ListenerKind::StagePointer));
    finish(&mut viewer);
    assert_eq!(viewer.listeners().active(), vec![ListenerKind::MutationWatch]);

    viewer.destroy();
    assert!(viewer.listeners().is_empty());
}

#[test]
fn test_repeated_open_close_leaks_nothing() {
    let (doc, _) = page(&["a.jpg", "b.jpg"]);
    let mut viewer = create(ViewerConfig::new(), &doc);
    for _ in 0..5 {
        viewer.open(0);
        viewer.open(1);
        viewer.close();
        viewer.close();
        viewer.transition_end();
    }
    assert_eq!(viewer.listeners().active(), vec![ListenerKind::MutationWatch]);
    assert!(!doc.body_has_class(class::LOCK));
}

#[test]
fn test_callbacks_fire_once_per_transition() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (opened, closed) = (log.clone(), log.clone());
    let (doc, _) = page(&["a.jpg"]);
    let mut viewer = create(
        ViewerConfig::new()
            .on_open(move || opened.borrow_mut().push("open"))
            .on_close(move || closed.borrow_mut().push("close")),
        &doc,
    );
    viewer.open(0);
    viewer.open(0);
    viewer.close();
    viewer.transition_end();
    finish(&mut viewer);
    assert_eq!(*log.borrow(), vec!["open", "close"]);
}

#[test]
fn test_drag_then_click_keeps_gallery_open() {
    let (doc, _) = page(&["a.jpg"]);
    let mut viewer = create(ViewerConfig::new(), &doc);
    viewer.open(0);
    let start = Pos2::new(300.0, 300.0);
    viewer.handle_input(InputEvent::MouseDown {
        pos: start,
        button: MouseButton::Primary,
        target: HitTarget::Image,
    });
    viewer.handle_input(InputEvent::MouseMove { pos: Pos2::new(320.0, 300.0) });
    viewer.handle_input(InputEvent::MouseUp { pos: Pos2::new(320.0, 300.0) });
    viewer.handle_input(InputEvent::Click { target: HitTarget::Image });
    assert!(viewer.is_open());
    assert_eq!(viewer.transform().unwrap().pan.x, 20.0);

    viewer.handle_input(InputEvent::MouseDown {
        pos: start,
        button: MouseButton::Primary,
        target: HitTarget::Image,
    });
    viewer.handle_input(InputEvent::MouseUp { pos: start });
    viewer.handle_input(InputEvent::Click { target: HitTarget::Image });
    assert!(!viewer.is_open());
}

#[test]
fn test_stage_click_closes_even_after_pan() {
    let (doc, _) = page(&["a.jpg"]);
    let mut viewer = create(ViewerConfig::new(), &doc);
    viewer.open(0);
    let start = Pos2::new(40.0, 40.0);
    viewer.handle_input(InputEvent::MouseDown {
        pos: start,
        button: MouseButton::Primary,
        target: HitTarget::Stage,
    });
    viewer.handle_input(InputEvent::MouseMove { pos: Pos2::new(90.0, 40.0) });
    viewer.handle_input(InputEvent::MouseUp { pos: Pos2::new(90.0, 40.0) });
    viewer.handle_input(InputEvent::Click { target: HitTarget::Stage });
    assert!(!viewer.is_open());
}

#[test]
fn test_controls_and_keys_share_the_engine() {
    let (doc, _) = page(&["a.jpg", "b.jpg"]);
    let mut viewer = create(ViewerConfig::new(), &doc);
    viewer.open(0);
    viewer.perform(Action::ZoomIn);
    viewer.handle_input(InputEvent::Key(Key::Plus));
    assert_eq!(viewer.overlay().unwrap().zoom_label, "156%");
    viewer.handle_input(InputEvent::Key(Key::Zero));
    assert_eq!(viewer.overlay().unwrap().zoom_label, "100%");
    viewer.perform(Action::Next);
    assert_eq!(viewer.index(), Some(1));
    viewer.perform(Action::Close);
    assert!(!viewer.is_open());
}

#[test]
fn test_scroll_lock_spans_the_session() {
    let (doc, _) = page(&["a.jpg"]);
    let mut viewer = create(ViewerConfig::new(), &doc);
    viewer.open(0);
    assert!(doc.body_has_class(class::LOCK));
    viewer.close();
    assert!(doc.body_has_class(class::LOCK));
    viewer.transition_end();
    assert!(!doc.body_has_class(class::LOCK));
}

#[test]
fn test_dropping_open_viewer_releases_lock() {
    let (doc, _) = page(&["a.jpg"]);
    {
        let mut viewer = create(ViewerConfig::new(), &doc);
        viewer.open(0);
    }
    assert!(!doc.body_has_class(class::LOCK));
    assert_eq!(doc.watcher_count(), 0);
}
