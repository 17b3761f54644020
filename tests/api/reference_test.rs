//! Reference table loading against a mock metadata host.

use lobby_info::api::client::ApiClient;
use lobby_info::api::models::CustomizationCategory;
use lobby_info::api::ApiError;
use lobby_info::reference::ReferenceData;

use crate::mock_server::MockServer;

const CHARACTERS: &str = r#"{
    "268435456": {"displayName": "The Trapper", "role": "EPlayerRole::VE_Slasher"},
    "0": {"displayName": "Dwight Fairfield", "role": "EPlayerRole::VE_Camper"}
}"#;

const ITEMS: &str = r#"[
    {"id": "TR_Head01", "associatedCharacter": 268435456, "category": "ECustomizationCategory::KillerHead", "displayName": "Trapper Mask"},
    {"id": "DF_Torso01", "associatedCharacter": "0", "category": "ECustomizationCategory::SurvivorTorso"}
]"#;

async fn load(server: &MockServer) -> Result<ReferenceData, ApiError> {
    let client = match ApiClient::new(server.url()) {
        Ok(client) => client,
        Err(err) => panic!("client should build: {err}"),
    };
    ReferenceData::load(&client, &server.url()).await
}

#[tokio::test]
async fn loads_both_tables() {
    let server = MockServer::start(|request| match request {
        "GET /api/characters" => (200, CHARACTERS.to_owned()),
        "GET /api/customizationitems" => (200, ITEMS.to_owned()),
        _ => (404, String::new()),
    })
    .await;

    let data = match load(&server).await {
        Ok(data) => data,
        Err(err) => panic!("reference data should load: {err}"),
    };

    assert_eq!(data.character_count(), 2);
    assert_eq!(data.item_count(), 2);

    let (item, character) = match data.outfit("TR_Head01") {
        Some(found) => found,
        None => panic!("outfit should resolve"),
    };
    assert_eq!(item.category, CustomizationCategory::KillerHead);
    assert_eq!(character.display_name, "The Trapper");
    assert!(character.is_killer());

    assert_eq!(
        server.requests(),
        vec![
            "GET /api/characters".to_owned(),
            "GET /api/customizationitems".to_owned()
        ]
    );
}

#[tokio::test]
async fn failed_character_fetch_stops_loading() {
    let server = MockServer::start(|_| (500, "maintenance".to_owned())).await;

    match load(&server).await {
        Err(ApiError::HttpStatus { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected http status error, got: {other:?}"),
    }
    assert_eq!(server.requests(), vec!["GET /api/characters".to_owned()]);
}

#[tokio::test]
async fn failed_item_fetch_is_fatal() {
    let server = MockServer::start(|request| match request {
        "GET /api/characters" => (200, CHARACTERS.to_owned()),
        _ => (503, "unavailable".to_owned()),
    })
    .await;

    assert!(matches!(
        load(&server).await,
        Err(ApiError::HttpStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn malformed_table_is_parse_error() {
    let server = MockServer::start(|_| (200, r#""just a string""#.to_owned())).await;

    match load(&server).await {
        Err(ApiError::Parse(message)) => assert!(message.starts_with("characters")),
        other => panic!("expected parse error, got: {other:?}"),
    }
}
