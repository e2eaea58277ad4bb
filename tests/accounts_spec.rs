//! Session and account handle tests against an in-process vendor.

mod common;

use chrono::NaiveDate;
use common::*;
use ecoledirecte::models::{AccountKind, GradeValue, MessageKind, TimelineKind};
use ecoledirecte::{ClientError, Family, HomeworkQuery, Session, Student};
use serde_json::json;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn student_session(vendor: &MockVendor) -> Student {
    vendor.on("/v3/login.awp", student_login("tok-login", "/photos/4242.jpg"));
    let session = Session::login(vendor.client(), "jdupont", "secret")
        .await
        .expect("Login failed");
    Student::new(&session).expect("Not a student account")
}

fn textbook_path(date: &str) -> String {
    format!("/v3/Eleves/{}/cahierdetexte/{}.awp", STUDENT_ID, date)
}

mod login {
    use super::*;

    #[tokio::test]
    async fn stores_token_and_accounts() {
        let vendor = MockVendor::start().await;
        vendor.on("/v3/login.awp", student_login("tok-login", ""));

        let session = Session::login(vendor.client(), "jdupont", "secret")
            .await
            .expect("Login failed");

        assert_eq!(session.token().get(), "tok-login");
        let account = session.main_account().expect("No main account");
        assert_eq!(account.id, STUDENT_ID);
        assert_eq!(account.kind, AccountKind::Student);
        assert_eq!(account.full_name(), "Jeanne DUPONT");
        assert_eq!(account.class.as_ref().unwrap().code, "4B");
        assert!(account.photo_url.is_none());
        assert!(account.has_module("NOTES"));
        assert!(!account.has_module("VIE_SCOLAIRE"));

        let sent = vendor.requests_to("/v3/login.awp")[0].data();
        assert_eq!(sent["identifiant"], "jdupont");
        assert_eq!(sent["motdepasse"], "secret");
        assert_eq!(sent["isRelogin"], false);
    }

    #[tokio::test]
    async fn bad_credentials_surface_vendor_error() {
        let vendor = MockVendor::start().await;
        vendor.on(
            "/v3/login.awp",
            failure(505, "Identifiant et/ou mot de passe invalide !"),
        );

        let result = Session::login(vendor.client(), "jdupont", "wrong").await;

        match result {
            Err(ClientError::Api(failure)) => assert_eq!(failure.code, 505),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_token_is_an_account_error() {
        let vendor = MockVendor::start().await;
        vendor.on("/v3/login.awp", json!({"code": 200, "data": {"accounts": []}}));

        let result = Session::login(vendor.client(), "jdupont", "secret").await;

        assert!(matches!(result, Err(ClientError::Account(_))));
    }

    #[tokio::test]
    async fn student_handle_requires_student_account() {
        let vendor = MockVendor::start().await;
        vendor.on("/v3/login.awp", family_login("tok"));

        let session = Session::login(vendor.client(), "famille", "secret")
            .await
            .expect("Login failed");

        assert!(matches!(Student::new(&session), Err(ClientError::Account(_))));
        assert!(Family::new(&session).is_ok());
    }
}

mod homework {
    use super::*;

    #[tokio::test]
    async fn fetches_requested_days_sorted_by_date() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        vendor.on(
            &textbook_path("2021-05-12"),
            ok("tok-a", textbook_page("2021-05-12", "<p>Exercice 3</p>")),
        );
        vendor.on(
            &textbook_path("2021-05-10"),
            ok("tok-b", textbook_page("2021-05-10", "<p>Exercice 1</p>")),
        );

        let homework = student
            .get_homework(HomeworkQuery::for_dates(["2021-05-12", "2021-05-10"]))
            .await
            .expect("Homework failed");

        assert_eq!(homework.len(), 4);
        assert_eq!(homework[0].date, date("2021-05-10"));
        assert_eq!(homework[3].date, date("2021-05-12"));
        let job = homework[0].job.as_ref().expect("Missing job");
        assert_eq!(job.content.text, "Exercice 1");
        assert_eq!(job.documents[0].size_label, "1.50 KB");
        assert!(["tok-a", "tok-b"].contains(&student.token().get().as_str()));
    }

    #[tokio::test]
    async fn only_with_work_drops_session_only_entries() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        vendor.on(
            &textbook_path("2021-05-10"),
            ok("tok-b", textbook_page("2021-05-10", "<p>Exercice 1</p>")),
        );

        let homework = student
            .get_homework(HomeworkQuery::on("2021-05-10").only_with_work())
            .await
            .expect("Homework failed");

        assert_eq!(homework.len(), 1);
        assert_eq!(homework[0].subject.code, "MATHS");
    }

    #[tokio::test]
    async fn without_dates_uses_upcoming_overview() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        vendor.on(
            &format!("/v3/Eleves/{}/cahierdetexte.awp", STUDENT_ID),
            ok(
                "tok-overview",
                json!({
                    "2021-05-12": [{"idDevoir": 1, "aFaire": true}],
                    "2021-05-10": [{"idDevoir": 2, "aFaire": true}]
                }),
            ),
        );
        vendor.on(
            &textbook_path("2021-05-10"),
            ok("tok-a", textbook_page("2021-05-10", "<p>A</p>")),
        );
        vendor.on(
            &textbook_path("2021-05-12"),
            ok("tok-b", textbook_page("2021-05-12", "<p>B</p>")),
        );

        let homework = student
            .get_homework(HomeworkQuery::upcoming())
            .await
            .expect("Homework failed");

        assert_eq!(homework.len(), 4);
        // Pages are fetched with the token rotated by the overview call.
        for req in vendor.requests_to(&textbook_path("2021-05-10")) {
            assert_eq!(req.header("x-token").as_deref(), Some("tok-overview"));
        }
    }

    #[tokio::test]
    async fn malformed_date_fails_before_any_request() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        let before = vendor.requests().len();

        let result = student
            .get_homework(HomeworkQuery::for_dates(["2021-05-10", "not a date"]))
            .await;

        assert!(matches!(result, Err(ClientError::InvalidDate(d)) if d == "not a date"));
        assert_eq!(vendor.requests().len(), before);
    }

    #[tokio::test]
    async fn empty_overview_yields_no_homework() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        vendor.on(
            &format!("/v3/Eleves/{}/cahierdetexte.awp", STUDENT_ID),
            ok("tok", json!([])),
        );

        let homework = student
            .get_homework(HomeworkQuery::upcoming())
            .await
            .expect("Homework failed");

        assert!(homework.is_empty());
    }
}

mod messages {
    use super::*;

    fn listing(kind: &str, ids: &[i64]) -> serde_json::Value {
        let list: Vec<_> = ids
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "mtype": kind,
                    "read": true,
                    "subject": format!("Message {}", id),
                    "date": "2021-05-01 10:00:00",
                    "from": { "id": 3, "name": "M. MARTIN", "role": "P" }
                })
            })
            .collect();
        let mut messages = json!({ "received": [], "sent": [] });
        messages[kind] = json!(list);
        json!({ "classeurs": [], "messages": messages })
    }

    #[tokio::test]
    async fn stitches_received_and_sent_sequentially() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        let path = format!("/v3/eleves/{}/messages.awp", STUDENT_ID);
        vendor.on(&path, ok("tok-received", listing("received", &[30, 10])));
        vendor.on(&path, ok("tok-sent", listing("sent", &[20])));

        let messages = student.get_messages().await.expect("Messages failed");

        let ids: Vec<_> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(messages[1].kind, MessageKind::Sent);
        assert_eq!(messages[0].kind, MessageKind::Received);

        let requests = vendor.requests_to(&path);
        assert_eq!(requests.len(), 2);
        assert!(requests[0].query.contains("typeRecuperation=received"));
        assert!(requests[1].query.contains("typeRecuperation=sent"));
        assert_eq!(requests[1].header("x-token").as_deref(), Some("tok-received"));
        assert_eq!(student.token().get(), "tok-sent");
    }

    #[tokio::test]
    async fn opens_one_message_with_decoded_content() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        vendor.on(
            &format!("/v3/eleves/{}/messages/77.awp", STUDENT_ID),
            ok(
                "tok",
                json!({
                    "id": 77,
                    "subject": "Sortie scolaire",
                    "content": b64("<p>Rendez-vous &agrave; 8h</p>"),
                    "date": "2021-05-02 09:30:00",
                    "files": [{ "id": 1, "libelle": "autorisation.pdf", "type": "PIECE_JOINTE", "taille": 2048 }]
                }),
            ),
        );

        let detail = student
            .get_message(77, MessageKind::Received)
            .await
            .expect("Message failed");

        assert_eq!(detail.message.subject, "Sortie scolaire");
        assert_eq!(detail.content.text, "Rendez-vous à 8h");
        assert_eq!(detail.files[0].size_label, "2.00 KB");
        let req = &vendor.requests_to(&format!("/v3/eleves/{}/messages/77.awp", STUDENT_ID))[0];
        assert!(req.query.contains("mode=destinataire"));
    }
}

mod grades_and_periods {
    use super::*;

    fn grades_payload() -> serde_json::Value {
        json!({
            "foStat": [],
            "periodes": [{
                "idPeriode": "A001",
                "codePeriode": "A001",
                "periode": "1er Trimestre",
                "annuel": false,
                "dateDebut": "2020-09-01",
                "dateFin": "2020-11-30",
                "ensembleMatieres": {
                    "moyenneGenerale": "14,20",
                    "disciplines": [
                        { "id": 1, "codeMatiere": "MATHS", "discipline": "MATHEMATIQUES", "moyenne": "15,5" }
                    ]
                }
            }],
            "notes": [{
                "id": 11,
                "devoir": "Contrôle",
                "codePeriode": "A001",
                "codeMatiere": "MATHS",
                "libelleMatiere": "MATHEMATIQUES",
                "valeur": "15,5",
                "noteSur": "20",
                "coef": "2",
                "date": "2020-10-01"
            }]
        })
    }

    #[tokio::test]
    async fn grades_and_periods_share_endpoint() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        let path = format!("/v3/eleves/{}/notes.awp", STUDENT_ID);
        vendor.on(&path, ok("tok-grades", grades_payload()));

        let grades = student.get_grades().await.expect("Grades failed");
        let periods = student.get_periods().await.expect("Periods failed");

        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].value, GradeValue::Number(15.5));
        assert_eq!(grades[0].coefficient, Some(2.0));
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].averages.student, Some(14.2));
        assert_eq!(periods[0].subjects[0].averages.student, Some(15.5));
        assert_eq!(vendor.requests_to(&path).len(), 2);
    }

    #[tokio::test]
    async fn expired_token_is_reported() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        vendor.on(
            &format!("/v3/eleves/{}/notes.awp", STUDENT_ID),
            failure(525, "Token invalide"),
        );

        let result = student.get_grades().await;

        match result {
            Err(ClientError::Api(failure)) => {
                assert_eq!(failure.code, 525);
                assert_eq!(failure.message, "Token invalide");
            }
            other => panic!("expected API error, got {:?}", other),
        }
        assert_eq!(student.token().get(), "tok-login");
    }
}

mod timeline_and_photo {
    use super::*;

    #[tokio::test]
    async fn timeline_is_cleaned() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        vendor.on(
            &format!("/v3/eleves/{}/timeline.awp", STUDENT_ID),
            ok(
                "tok",
                json!([
                    { "date": "2021-05-03", "typeElement": "Note", "idElement": 11, "titre": "Nouvelle note", "soustitre": "MATHS", "contenu": "Contrôle" },
                    { "date": "2021-05-01", "typeElement": "Messagerie", "idElement": 77, "titre": "Nouveau message", "soustitre": "", "contenu": "" }
                ]),
            ),
        );

        let timeline = student.timeline().await.expect("Timeline failed");

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].kind, TimelineKind::Grade);
        assert_eq!(timeline[1].kind, TimelineKind::Message);
        assert_eq!(timeline[1].element_id, 77);
    }

    #[tokio::test]
    async fn downloads_profile_photo() {
        let vendor = MockVendor::start().await;
        let student = student_session(&vendor).await;
        vendor.on_bytes("/photos/4242.jpg", b"photo-bytes");

        let photo = student.get_photo().await.expect("Photo failed");

        assert_eq!(photo.as_deref(), Some(&b"photo-bytes"[..]));
    }

    #[tokio::test]
    async fn no_photo_url_means_no_request() {
        let vendor = MockVendor::start().await;
        vendor.on("/v3/login.awp", student_login("tok", ""));
        let session = Session::login(vendor.client(), "jdupont", "secret")
            .await
            .expect("Login failed");
        let student = Student::new(&session).expect("Not a student");

        assert!(student.get_photo().await.expect("Photo failed").is_none());
        assert_eq!(vendor.requests().len(), 1);
    }
}

mod family {
    use super::*;

    #[tokio::test]
    async fn children_share_the_family_token() {
        let vendor = MockVendor::start().await;
        vendor.on("/v3/login.awp", family_login("tok-family"));
        let session = Session::login(vendor.client(), "famille", "secret")
            .await
            .expect("Login failed");
        let family = Family::new(&session).expect("Not a family account");

        assert_eq!(family.children().len(), 2);
        assert_eq!(family.children()[0].first_name, "Léo");
        assert!(family.children()[1].class.is_none());

        let leo = family.student(901).expect("Missing child");
        let zoe = family.student(902).expect("Missing child");
        assert_eq!(leo.account().kind, AccountKind::Student);
        assert_eq!(leo.account().class.as_ref().unwrap().code, "6A");

        vendor.on("/v3/eleves/901/timeline.awp", ok("tok-after-leo", json!([])));
        vendor.on("/v3/eleves/902/timeline.awp", ok("tok-after-zoe", json!([])));
        leo.timeline().await.expect("Timeline failed");
        zoe.timeline().await.expect("Timeline failed");

        let zoe_req = &vendor.requests_to("/v3/eleves/902/timeline.awp")[0];
        assert_eq!(zoe_req.header("x-token").as_deref(), Some("tok-after-leo"));
        assert_eq!(session.token().get(), "tok-after-zoe");
    }

    #[tokio::test]
    async fn unknown_child_is_an_error() {
        let vendor = MockVendor::start().await;
        vendor.on("/v3/login.awp", family_login("tok"));
        let session = Session::login(vendor.client(), "famille", "secret")
            .await
            .expect("Login failed");
        let family = Family::new(&session).expect("Not a family account");

        assert!(matches!(family.student(1), Err(ClientError::Account(_))));
        assert_eq!(family.students().len(), 2);
    }
}
