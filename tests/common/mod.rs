//! Shared fixtures and a minimal HTTP gateway for integration tests.
#![allow(dead_code)]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use pesa::{Pesa, PesaConfig, SessionId, TransactionKind, TransactionResponse};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

pub const API_KEY: &str = "K";
pub const PUBLIC_KEY: &str = include_str!("../fixtures/gateway_public.pem");
pub const PRIVATE_KEY: &str = include_str!("../fixtures/gateway_private.pem");

pub fn session_body() -> Value {
    json!({
        "output_ResponseCode": "INS-0",
        "output_ResponseDesc": "Request processed successfully",
        "output_SessionID": 1
    })
}

pub fn transaction_body() -> Value {
    json!({
        "output_ResponseCode": "INS-0",
        "output_ResponseDesc": "Request processed successfully",
        "output_ConversationID": "f1ddae567e6c45e580504764571dbe2f",
        "output_ThirdPartyConversationID": "Narration"
    })
}

/// A plausible payload for each kind, with the gateway's field names.
pub fn payload_for(kind: TransactionKind) -> Value {
    match kind {
        TransactionKind::C2b => json!({
            "input_Amount": "10",
            "input_Country": "TZN",
            "input_Currency": "TZS",
            "input_CustomerMSISDN": "000000000001",
            "input_ServiceProviderCode": "000000",
            "input_ThirdPartyConversationID": "c9e794e10c63479992a8b08703abeea3",
            "input_TransactionReference": "T12344C",
            "input_PurchasedItemsDesc": "Shoes"
        }),
        TransactionKind::B2b => json!({
            "input_Amount": "10",
            "input_Country": "TZN",
            "input_Currency": "TZS",
            "input_PrimaryPartyCode": "000000",
            "input_ReceiverPartyCode": "000001",
            "input_ThirdPartyConversationID": "8a89835c71f15e99396",
            "input_TransactionReference": "T12344C",
            "input_PurchasedItemsDesc": "Shoes"
        }),
        TransactionKind::B2c => json!({
            "input_Amount": "10",
            "input_Country": "TZN",
            "input_Currency": "TZS",
            "input_CustomerMSISDN": "000000000001",
            "input_ServiceProviderCode": "000000",
            "input_ThirdPartyConversationID": "f5e420e99594a9c496d8600",
            "input_TransactionReference": "T12345C",
            "input_PaymentItemsDesc": "Salary payment"
        }),
        TransactionKind::Reverse => json!({
            "input_ReversalAmount": "25",
            "input_Country": "TZN",
            "input_ServiceProviderCode": "000000",
            "input_ThirdPartyConversationID": "asv02e5958774f7ba228d83d0d689761",
            "input_TransactionID": "0000000000001"
        }),
        TransactionKind::Query => json!({
            "input_QueryReference": "000000000000000000001",
            "input_Country": "TZN",
            "input_ServiceProviderCode": "000000",
            "input_ThirdPartyConversationID": "asv02e5958774f7ba228d83d0d689761"
        }),
        TransactionKind::DebitCreate => json!({
            "input_AgreedTC": "1",
            "input_Country": "TZN",
            "input_CustomerMSISDN": "000000000001",
            "input_EndRangeOfDays": "22",
            "input_ExpiryDate": "20211126",
            "input_FirstPaymentDate": "20160324",
            "input_Frequency": "06",
            "input_ServiceProviderCode": "000000",
            "input_StartRangeOfDays": "01",
            "input_ThirdPartyConversationID": "AAA6d1f9391a0052de0b5334a912jbsj1j2kk",
            "input_ThirdPartyReference": "3333"
        }),
        TransactionKind::DebitPayment => json!({
            "input_Amount": "10",
            "input_Country": "TZN",
            "input_Currency": "TZS",
            "input_CustomerMSISDN": "000000000001",
            "input_ServiceProviderCode": "000000",
            "input_ThirdPartyConversationID": "AAA6d1f939c1005v2de053v4912jbasdj1j2kk",
            "input_ThirdPartyReference": "5db410b459bd433ca8e5"
        }),
    }
}

/// Calls the named operation for `kind`, so every public method gets exercised.
pub async fn call(
    pesa: &Pesa,
    kind: TransactionKind,
    payload: &Value,
    session: &SessionId,
) -> pesa::Result<TransactionResponse> {
    match kind {
        TransactionKind::C2b => pesa.c2b(payload, session).await,
        TransactionKind::B2b => pesa.b2b(payload, session).await,
        TransactionKind::B2c => pesa.b2c(payload, session).await,
        TransactionKind::Reverse => pesa.reverse(payload, session).await,
        TransactionKind::Query => pesa.query(payload, session).await,
        TransactionKind::DebitCreate => pesa.debit_create(payload, session).await,
        TransactionKind::DebitPayment => pesa.debit_payment(payload, session).await,
    }
}

pub fn config() -> PesaConfig {
    PesaConfig::new(API_KEY, PUBLIC_KEY)
}

/// Decrypts an `Authorization: Bearer` value with the fixture private key.
pub fn decrypt_bearer(header: &str) -> String {
    let token = header.strip_prefix("Bearer ").expect("bearer prefix");
    let key = RsaPrivateKey::from_pkcs1_pem(PRIVATE_KEY).unwrap();
    let ciphertext = STANDARD.decode(token).unwrap();
    String::from_utf8(key.decrypt(Pkcs1v15Encrypt, &ciphertext).unwrap()).unwrap()
}

/// Address nothing listens on.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A gateway stand-in that answers from a fixed list of `(status, body)` replies.
pub struct MockGateway {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockGateway {
    pub fn base_url(&self) -> url::Url {
        url::Url::parse(&format!("http://{}/ipg/v2/vodacomTZN/", self.addr)).unwrap()
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

pub async fn start_mock_gateway(replies: Vec<(u16, String)>) -> MockGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let replies = Arc::new(Mutex::new(replies.into_iter()));

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let Some(request) = read_request(&mut socket).await else {
                continue;
            };
            recorded.lock().await.push(request);

            let (status, body) = replies
                .lock()
                .await
                .next()
                .unwrap_or((500, "no reply scripted".to_string()));
            let response = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                reason(status),
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    MockGateway { addr, requests }
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();

    Some(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        400 => "Bad Request",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
