//! Request shapes of the resource APIs.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use staymate_client::ClientError;
use staymate_types::{
    ApplicationId, ApplicationStatus, BookingId, BookingRequest, BookingStatus, DocumentStatus,
    NotificationFilter, PageRequest, PayoutRequestId, PayoutStatus, PropertyId, PropertyRequest,
    PropertySearch, RoommatePostId, RoommateSearch,
};
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
    query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{conversation_list, logged_in_client};

fn property_json(id: i64, title: &str) -> serde_json::Value {
    json!({ "id": id, "title": title, "beds": 2, "baths": 1 })
}

#[tokio::test]
async fn short_user_search_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    assert!(client.users().search(" a ").await.unwrap().is_empty());
}

#[tokio::test]
async fn conversation_search_is_trimmed_and_blank_is_omitted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/messages/conversations"))
        .and(query_param("search", "ana"))
        .and(query_param("page", "0"))
        .and(query_param("size", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(conversation_list(vec![], 0)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/messages/conversations"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(conversation_list(vec![], 0)))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let messages = client.messages();
    messages
        .conversations(PageRequest::default(), Some("  ana "))
        .await
        .unwrap();
    messages
        .conversations(PageRequest::default(), Some("   "))
        .await
        .unwrap();
}

#[tokio::test]
async fn property_create_is_a_multipart_form_with_a_json_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/properties"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"data\""))
        .and(body_string_contains("\"title\":\"Loft\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(property_json(9, "Loft")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let listing = PropertyRequest {
        title: "Loft".into(),
        price: 1200.0,
        beds: Some(2),
        ..PropertyRequest::default()
    };
    let created = client.properties().create(&listing).await.unwrap();
    assert_eq!(created.id, PropertyId::new(9));
}

#[tokio::test]
async fn property_search_uses_backend_parameter_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/properties/search"))
        .and(query_param("query", "loft"))
        .and(query_param("minPrice", "500"))
        .and(query_param("minBeds", "2"))
        .and(query_param_is_missing("maxPrice"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([property_json(1, "Loft")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let search = PropertySearch {
        query: Some("loft".into()),
        min_price: Some(500.0),
        min_beds: Some(2),
        ..PropertySearch::default()
    };
    let found = client.properties().search(&search).await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn availability_check_sends_iso_dates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/properties/4/availability/check"))
        .and(query_param("startDate", "2024-06-01"))
        .and(query_param("endDate", "2024-06-10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "available": true })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    let properties = client.properties();
    assert!(properties.check_availability(PropertyId::new(4), start, end).await.unwrap());
    assert!(matches!(
        properties.check_availability(PropertyId::new(4), end, start).await,
        Err(ClientError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn booking_with_reversed_dates_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let request = BookingRequest {
        property_id: PropertyId::new(1),
        start_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        notes: None,
    };
    assert!(matches!(
        client.bookings().create(&request).await,
        Err(ClientError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn booking_status_goes_in_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/bookings/12/status"))
        .and(query_param("status", "CHECKED_IN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "tenantId": 1,
            "landlordId": 2,
            "propertyId": 3,
            "startDate": "2024-06-01",
            "endDate": "2024-06-10",
            "status": "CHECKED_IN"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let booking = client
        .bookings()
        .update_status(BookingId::new(12), BookingStatus::CheckedIn)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::CheckedIn);
    assert!(
        client
            .bookings()
            .update_status(BookingId::new(12), BookingStatus::Unknown)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn unread_notification_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .and(query_param("filter", "unread"))
        .and(header("Authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [],
            "unreadCount": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let list = client
        .notifications()
        .list(PageRequest::default(), Some(NotificationFilter::Unread))
        .await
        .unwrap();
    assert_eq!(list.unread_count, 4);
}

#[tokio::test]
async fn payout_processing_sends_status_and_trimmed_notes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/finance/admin/payout-requests/5/process"))
        .and(query_param("status", "APPROVED"))
        .and(query_param("notes", "ok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let finance = client.finance();
    finance
        .process_payout_request(PayoutRequestId::new(5), PayoutStatus::Approved, Some(" ok "))
        .await
        .unwrap();
    assert!(matches!(
        finance
            .process_payout_request(PayoutRequestId::new(5), PayoutStatus::Unknown, None)
            .await,
        Err(ClientError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn earnings_export_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/finance/export"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"date,amount\n".to_vec()))
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    assert_eq!(client.finance().export_csv().await.unwrap(), b"date,amount\n");
}

#[tokio::test]
async fn api_errors_carry_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/users/3"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "status": 403,
            "error": "Forbidden",
            "message": "Admins only"
        })))
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let err = client
        .admin()
        .delete_user(staymate_types::UserId::new(3))
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
    assert_eq!(err.to_string(), "403 Forbidden: Admins only");
}

fn roommate_json(id: i64, score: u32) -> serde_json::Value {
    json!({
        "id": id,
        "userName": "Kai",
        "location": "Dhaka",
        "budget": 9000.0,
        "matchScore": score,
        "isSaved": true
    })
}

#[tokio::test]
async fn roommate_matches_accept_a_list_or_a_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/roommates/matches"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([roommate_json(1, 90)])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/roommates/matches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [roommate_json(2, 75), roommate_json(3, 60)],
            "totalElements": 2,
            "totalPages": 1
        })))
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let listed = client.roommates().matches().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].match_score, Some(90));
    assert!(listed[0].saved);

    let paged = client.roommates().matches().await.unwrap();
    let ids: Vec<_> = paged.iter().filter_map(|p| p.id).collect();
    assert_eq!(ids, vec![RoommatePostId::new(2), RoommatePostId::new(3)]);
}

#[tokio::test]
async fn roommate_search_uses_backend_parameter_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/roommates"))
        .and(query_param("location", "Dhaka"))
        .and(query_param("maxBudget", "10000"))
        .and(query_param_is_missing("minBudget"))
        .and(query_param_is_missing("genderPreference"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([roommate_json(4, 0)])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let filters = RoommateSearch {
        location: Some(" Dhaka ".into()),
        max_budget: Some(10000.0),
        gender_preference: Some("  ".into()),
        ..RoommateSearch::default()
    };
    let found = client.roommates().search(&filters).await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn received_applications_page_and_status_change() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/applications/received"))
        .and(query_param("page", "0"))
        .and(query_param("size", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{
                "id": 5,
                "senderId": 8,
                "senderName": "Ana",
                "propertyTitle": "Loft",
                "status": "PENDING"
            }],
            "totalElements": 1,
            "totalPages": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/applications/5/status"))
        .and(query_param("status", "ACCEPTED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "senderId": 8,
            "status": "APPROVED"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let page = client
        .applications()
        .received(PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.content[0].status, ApplicationStatus::Pending);

    let updated = client
        .applications()
        .update_status(ApplicationId::new(5), ApplicationStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(updated.status, ApplicationStatus::Accepted);
    assert!(matches!(
        client
            .applications()
            .update_status(ApplicationId::new(5), ApplicationStatus::Pending)
            .await,
        Err(ClientError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn phone_verification_round() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/verification/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "emailVerified": true,
            "phoneVerified": false,
            "documentStatus": "PENDING"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/verification/phone"))
        .and(body_json(json!({ "phoneNumber": "+8801700000000" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "otp": "123456" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/verification/phone/verify"))
        .and(body_json(json!({ "otp": "123456", "phone": "+8801700000000" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let verification = client.verification();
    let status = verification.status().await.unwrap();
    assert_eq!(status.document_status, DocumentStatus::Pending);

    let sent = verification
        .send_phone_code(" +8801700000000 ")
        .await
        .unwrap();
    assert_eq!(sent.otp.as_deref(), Some("123456"));
    verification
        .verify_phone("+8801700000000", " 123456 ")
        .await
        .unwrap();
}

#[tokio::test]
async fn document_upload_is_multipart_with_a_document_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/verification/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"file\"; filename=\"id.png\""))
        .and(body_string_contains("name=\"documentType\""))
        .and(body_string_contains("GOVERNMENT_ID"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "documentType": "GOVERNMENT_ID",
            "status": "PENDING"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let submitted = client
        .verification()
        .upload_document("id.png", b"PNG-bytes".to_vec(), None)
        .await
        .unwrap();
    assert_eq!(submitted.document_type.as_deref(), Some("GOVERNMENT_ID"));
    assert!(matches!(
        client
            .verification()
            .upload_document("id.png", Vec::new(), None)
            .await,
        Err(ClientError::InvalidRequest(_))
    ));
}
