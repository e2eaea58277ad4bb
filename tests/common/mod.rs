//! In-process stand-in for the vendor API.
//!
//! Replies are queued per path: each request pops the next reply, and the last one
//! keeps answering once the queue is down to a single entry.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use data_encoding::BASE64;
use serde_json::{json, Value};

use ecoledirecte::{ApiClient, ClientConfig};

/// A request as the vendor saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    /// The JSON carried in the `data` form field.
    pub fn data(&self) -> Value {
        let encoded = self
            .body
            .strip_prefix("data=")
            .expect("body is not a data= form");
        let json = urlencoding::decode(encoded).expect("body is not url-encoded");
        serde_json::from_str(&json).expect("data is not JSON")
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Json {
        body: Value,
        token_header: Option<String>,
    },
    Bytes(Vec<u8>),
    Status(u16),
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<String, Vec<Reply>>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockVendor {
    pub base_url: String,
    state: MockState,
}

impl MockVendor {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock vendor");
        let addr = listener.local_addr().expect("Failed to read mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock vendor crashed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(ClientConfig::default().with_root(&self.base_url))
    }

    pub fn on(&self, path: &str, body: Value) {
        self.push(
            path,
            Reply::Json {
                body,
                token_header: None,
            },
        );
    }

    pub fn on_with_token_header(&self, path: &str, body: Value, token: &str) {
        self.push(
            path,
            Reply::Json {
                body,
                token_header: Some(token.to_string()),
            },
        );
    }

    pub fn on_bytes(&self, path: &str, bytes: &[u8]) {
        self.push(path, Reply::Bytes(bytes.to_vec()));
    }

    pub fn on_status(&self, path: &str, status: u16) {
        self.push(path, Reply::Status(status));
    }

    fn push(&self, path: &str, reply: Reply) {
        self.state
            .routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(reply);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|req| req.path == path)
            .collect()
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().unwrap_or_default().to_string(),
        headers,
        body,
    });

    let reply = {
        let mut routes = state.routes.lock().unwrap();
        match routes.get_mut(&path) {
            Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
            Some(queue) => queue.first().cloned(),
            None => None,
        }
    };

    match reply {
        Some(Reply::Json { body, token_header }) => {
            let mut response = Json(body).into_response();
            if let Some(token) = token_header {
                response
                    .headers_mut()
                    .insert("x-token", HeaderValue::from_str(&token).unwrap());
            }
            response
        }
        Some(Reply::Bytes(bytes)) => bytes.into_response(),
        Some(Reply::Status(status)) => StatusCode::from_u16(status).unwrap().into_response(),
        None => (StatusCode::NOT_FOUND, format!("no reply for {}", path)).into_response(),
    }
}

// ============================================================
// Vendor payloads
// ============================================================

pub const STUDENT_ID: i64 = 4242;

pub fn ok(token: &str, data: Value) -> Value {
    json!({ "code": 200, "token": token, "message": "", "data": data })
}

pub fn failure(code: i64, message: &str) -> Value {
    json!({ "code": code, "token": "", "message": message, "data": {} })
}

pub fn b64(html: &str) -> String {
    BASE64.encode(html.as_bytes())
}

pub fn student_login(token: &str, photo: &str) -> Value {
    ok(
        token,
        json!({
            "accounts": [{
                "id": STUDENT_ID,
                "typeCompte": "E",
                "identifiant": "jdupont",
                "prenom": "Jeanne",
                "nom": "DUPONT",
                "email": "jeanne@example.org",
                "nomEtablissement": "Collège Jules Verne",
                "anneeScolaireCourante": "2020-2021",
                "main": true,
                "modules": [
                    { "code": "NOTES", "enable": true },
                    { "code": "VIE_SCOLAIRE", "enable": false }
                ],
                "profile": {
                    "sexe": "F",
                    "photo": photo,
                    "classe": { "id": 12, "code": "4B", "libelle": "Quatrième B" }
                }
            }]
        }),
    )
}

pub fn family_login(token: &str) -> Value {
    ok(
        token,
        json!({
            "accounts": [{
                "id": 900,
                "typeCompte": "1",
                "identifiant": "famille.dupont",
                "prenom": "Marc",
                "nom": "DUPONT",
                "main": true,
                "nomEtablissement": "Collège Jules Verne",
                "profile": {
                    "eleves": [
                        {
                            "id": 901,
                            "prenom": "Léo",
                            "nom": "DUPONT",
                            "photo": "",
                            "classe": { "id": 3, "code": "6A", "libelle": "Sixième A" },
                            "modules": [{ "code": "CAHIER_DE_TEXTES", "enable": true }]
                        },
                        {
                            "id": 902,
                            "prenom": "Zoé",
                            "nom": "DUPONT",
                            "classe": []
                        }
                    ]
                }
            }]
        }),
    )
}

pub fn textbook_page(date: &str, homework_html: &str) -> Value {
    json!({
        "date": date,
        "matieres": [
            {
                "id": 1,
                "matiere": "MATHEMATIQUES",
                "codeMatiere": "MATHS",
                "nomProf": " M. MARTIN",
                "interrogation": true,
                "aFaire": {
                    "idDevoir": 555,
                    "contenu": b64(homework_html),
                    "donneLe": "2021-05-03",
                    "effectue": false,
                    "rendreEnLigne": false,
                    "documents": [
                        { "id": 7, "libelle": "fiche.pdf", "type": "FICHIER_CDT", "taille": 1536 }
                    ],
                    "contenuDeSeance": {
                        "contenu": b64("<p>Chapitre 4</p>"),
                        "documents": []
                    }
                }
            },
            {
                "id": 2,
                "matiere": "HISTOIRE",
                "codeMatiere": "HG",
                "nomProf": "Mme DURAND",
                "interrogation": false,
                "contenuDeSeance": {
                    "contenu": b64("<p>La Révolution</p>"),
                    "documents": []
                }
            }
        ]
    })
}
