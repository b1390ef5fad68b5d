//! Wire-format checks for the realtime protocol: client frames decode by
//! their `event` tag, server frames encode with the fields the frontend
//! contract promises.

use backend::domain::cards::Card;
use backend::domain::snapshot::TableStateView;
use backend::domain::state::Phase;
use backend::ws::protocol::{ClientEvent, ServerEvent};
use std::collections::BTreeMap;

#[test]
fn client_event_play_card_decodes() {
    let json = r#"{"event":"play_card","card":"A♠"}"#;
    let event: ClientEvent = serde_json::from_str(json).unwrap();
    match event {
        ClientEvent::PlayCard { card } => assert_eq!(card.render(), "A♠"),
        _ => panic!("expected play_card"),
    }
}

#[test]
fn client_event_pass_cards_decodes() {
    let json = r#"{"event":"pass_cards","cards":["2♣","3♣","4♣"]}"#;
    let event: ClientEvent = serde_json::from_str(json).unwrap();
    match event {
        ClientEvent::PassCards { cards } => assert_eq!(cards.len(), 3),
        _ => panic!("expected pass_cards"),
    }
}

#[test]
fn client_event_request_initial_state_decodes() {
    let json = r#"{"event":"request_initial_state"}"#;
    let event: ClientEvent = serde_json::from_str(json).unwrap();
    assert!(matches!(event, ClientEvent::RequestInitialState));
}

#[test]
fn malformed_client_event_is_rejected() {
    let json = r#"{"event":"play_card","card":"ZZ"}"#;
    let res: Result<ClientEvent, _> = serde_json::from_str(json);
    assert!(res.is_err());
}

#[test]
fn server_event_error_tags_correctly() {
    let event = ServerEvent::Error { message: "Card not in hand.".to_string() };
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains(r#""event":"error""#));
    assert!(json.contains("Card not in hand."));
}

#[test]
fn server_event_your_turn_tags_correctly() {
    let event = ServerEvent::YourTurn { user_id: 42 };
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains(r#""event":"your_turn""#));
    assert!(json.contains("42"));
}

#[test]
fn server_event_player_update_carries_masked_view() {
    let view = TableStateView {
        round_number: 1,
        phase: Phase::Playing,
        seats: vec![],
        hand: vec![Card::parse("2♣").unwrap()],
        current_trick: vec![],
        lead_suit: None,
        turn_user_id: Some(1),
        hearts_broken: false,
        round_scores: BTreeMap::new(),
        has_passed: false,
    };
    let event = ServerEvent::PlayerUpdate { state: view };
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains(r#""event":"player_update""#));
    assert!(json.contains("\"2♣\""));
}
