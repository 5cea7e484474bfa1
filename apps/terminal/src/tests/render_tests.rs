use super::*;
use recipe_core::{Notification, NotificationId, NotificationKind, NotificationPhase};
use shared::domain::RecipeId;
use tokio::sync::broadcast;

fn card(id: i64, name: &str, origin: RecipeOrigin) -> RecipeCard {
    RecipeCard::render(
        &Recipe {
            id: RecipeId(id),
            name: name.to_string(),
            image: "https://img.example/x.png".into(),
            ingredients: vec!["pasta".into(), "cream".into()],
            instructions: vec!["boil".into(), "stir".into()],
        },
        origin,
    )
}

fn written(buf: &[u8]) -> &str {
    std::str::from_utf8(buf).expect("utf8")
}

#[test]
fn card_lists_ingredients_and_numbered_steps() {
    let mut buf = Vec::new();
    let mut renderer = TextRenderer::new(&mut buf);
    renderer
        .apply(&ViewEvent::CardRendered(card(3, "Creamy Pasta", RecipeOrigin::Remote)))
        .expect("render");
    drop(renderer);

    let text = written(&buf);
    assert!(text.starts_with("#1 Creamy Pasta [catalog, id 3]"));
    assert!(text.contains("     - cream"));
    assert!(text.contains("     2. stir"));
    assert!(text.contains("[DELETE RECIPE]"));
}

#[test]
fn clearing_results_restarts_numbering() {
    let mut buf = Vec::new();
    let mut renderer = TextRenderer::new(&mut buf);
    renderer
        .apply(&ViewEvent::CardRendered(card(1, "A", RecipeOrigin::Local)))
        .expect("a");
    renderer.apply(&ViewEvent::ResultsCleared).expect("clear");
    renderer
        .apply(&ViewEvent::CardRendered(card(2, "B", RecipeOrigin::Local)))
        .expect("b");
    assert_eq!(renderer.card_at(2), None);
    drop(renderer);

    let text = written(&buf);
    assert!(text.contains("#1 A [local, id 1]"));
    assert!(text.contains("#1 B [local, id 2]"));
}

#[test]
fn removal_renumbers_later_cards_and_new_cards_follow_on() {
    let a = card(1, "A", RecipeOrigin::Local);
    let b = card(2, "B", RecipeOrigin::Local);
    let c = card(3, "C", RecipeOrigin::Remote);
    let d = card(4, "D", RecipeOrigin::Local);

    let mut buf = Vec::new();
    let mut renderer = TextRenderer::new(&mut buf);
    for rendered in [&a, &b, &c] {
        renderer
            .apply(&ViewEvent::CardRendered(rendered.clone()))
            .expect("render");
    }
    renderer
        .apply(&ViewEvent::CardRemoved(a.card_id))
        .expect("remove");
    renderer
        .apply(&ViewEvent::CardRendered(d.clone()))
        .expect("render d");

    assert_eq!(renderer.card_at(1), Some(b.card_id));
    assert_eq!(renderer.card_at(2), Some(c.card_id));
    assert_eq!(renderer.card_at(3), Some(d.card_id));
    assert_eq!(renderer.card_at(4), None);
    assert_eq!(renderer.card_at(0), None);
    drop(renderer);

    let text = written(&buf);
    assert!(text.contains("(#1 A removed)\n  now #1 B\n  now #2 C\n"));
    assert!(text.contains("#3 D [local, id 4]"));
}

#[test]
fn listing_cards_resets_numbering() {
    let a = card(1, "A", RecipeOrigin::Local);
    let b = card(2, "B", RecipeOrigin::Remote);

    let mut buf = Vec::new();
    let mut renderer = TextRenderer::new(&mut buf);
    renderer
        .apply(&ViewEvent::CardRendered(a.clone()))
        .expect("render");
    renderer.print_cards(&[b.clone()]).expect("cards");

    assert_eq!(renderer.card_at(1), Some(b.card_id));
    assert_eq!(renderer.card_at(2), None);
}

#[test]
fn drain_writes_queued_notifications() {
    let (tx, mut rx) = broadcast::channel(8);
    let _ = tx.send(ViewEvent::NotificationShown(Notification {
        id: NotificationId(uuid::Uuid::nil()),
        kind: NotificationKind::Info,
        message: "No recipes found".into(),
        phase: NotificationPhase::Visible,
    }));
    let _ = tx.send(ViewEvent::MenuToggled { open: true });

    let mut buf = Vec::new();
    let mut renderer = TextRenderer::new(&mut buf);
    renderer.drain(&mut rx).expect("drain");
    drop(renderer);
    assert_eq!(written(&buf), "[info] No recipes found\nmenu opened\n");
}

#[test]
fn empty_lists_say_so() {
    let mut buf = Vec::new();
    let mut renderer = TextRenderer::new(&mut buf);
    renderer.print_cards(&[]).expect("cards");
    renderer.print_recipes(&[]).expect("recipes");
    drop(renderer);
    assert_eq!(written(&buf), "no cards rendered\nno local recipes\n");
}
