use crate::domain::field::{FieldValue, take_field};
use crate::domain::ports::HttpMethod;
use crate::error::PesaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Response code the gateway uses for a processed request.
pub const SUCCESS_CODE: &str = "INS-0";

/// Path of the session endpoint, relative to the base URL.
pub const SESSION_PATH: &str = "getSession/";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    C2b,
    B2b,
    B2c,
    Reverse,
    Query,
    DebitCreate,
    DebitPayment,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 7] = [
        TransactionKind::C2b,
        TransactionKind::B2b,
        TransactionKind::B2c,
        TransactionKind::Reverse,
        TransactionKind::Query,
        TransactionKind::DebitCreate,
        TransactionKind::DebitPayment,
    ];

    /// Endpoint suffix, joined onto the base URL.
    pub fn path(&self) -> &'static str {
        match self {
            TransactionKind::C2b => "c2bPayment/singleStage/",
            TransactionKind::B2b => "b2bPayment/",
            TransactionKind::B2c => "b2cPayment/",
            TransactionKind::Reverse => "reversal/",
            TransactionKind::Query => "queryTransactionStatus/",
            TransactionKind::DebitCreate => "directDebitCreation/",
            TransactionKind::DebitPayment => "directDebitPayment/",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            TransactionKind::Reverse => HttpMethod::Put,
            TransactionKind::Query => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TransactionKind::C2b => "Customer to Business",
            TransactionKind::B2b => "Business to Business",
            TransactionKind::B2c => "Business to Customer",
            TransactionKind::Reverse => "Reversal",
            TransactionKind::Query => "Query Transaction Status",
            TransactionKind::DebitCreate => "Direct Debit Creation",
            TransactionKind::DebitPayment => "Direct Debit Payment",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::C2b => "c2b",
            TransactionKind::B2b => "b2b",
            TransactionKind::B2c => "b2c",
            TransactionKind::Reverse => "reverse",
            TransactionKind::Query => "query",
            TransactionKind::DebitCreate => "debit-create",
            TransactionKind::DebitPayment => "debit-payment",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = PesaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        let wanted = match wanted.as_str() {
            "reversal" => "reverse",
            "ddc" => "debit-create",
            "ddp" => "debit-payment",
            other => other,
        };
        TransactionKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| PesaError::InvalidRequest(format!("unknown transaction kind '{s}'")))
    }
}

/// Body of a transaction reply.
///
/// Serializing it yields exactly the keys the gateway sent, explicit nulls
/// included: a documented field that is null or of an unexpected shape stays
/// in `extra` under its wire name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct TransactionResponse {
    #[serde(rename = "output_ResponseCode", skip_serializing_if = "Option::is_none")]
    pub response_code: Option<FieldValue>,
    #[serde(rename = "output_ResponseDesc", skip_serializing_if = "Option::is_none")]
    pub response_desc: Option<FieldValue>,
    /// Number or string, as the gateway sent it.
    #[serde(rename = "output_TransactionID", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<Value>,
    #[serde(rename = "output_ConversationID", skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<FieldValue>,
    #[serde(
        rename = "output_ThirdPartyConversationID",
        skip_serializing_if = "Option::is_none"
    )]
    pub third_party_conversation_id: Option<FieldValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for TransactionResponse {
    fn from(mut fields: Map<String, Value>) -> Self {
        TransactionResponse {
            response_code: take_field(&mut fields, "output_ResponseCode"),
            response_desc: take_field(&mut fields, "output_ResponseDesc"),
            transaction_id: take_field(&mut fields, "output_TransactionID"),
            conversation_id: take_field(&mut fields, "output_ConversationID"),
            third_party_conversation_id: take_field(&mut fields, "output_ThirdPartyConversationID"),
            extra: fields,
        }
    }
}

impl TransactionResponse {
    /// Text form of `output_ResponseCode`.
    pub fn code(&self) -> Option<&str> {
        self.response_code.as_ref().and_then(FieldValue::as_str)
    }

    /// Whether the gateway reported `INS-0`. Other codes are business outcomes for the caller.
    pub fn is_success(&self) -> bool {
        self.code() == Some(SUCCESS_CODE)
    }

    pub fn is_empty(&self) -> bool {
        self.response_code.is_none()
            && self.response_desc.is_none()
            && self.transaction_id.is_none()
            && self.conversation_id.is_none()
            && self.third_party_conversation_id.is_none()
            && self.extra.is_empty()
    }
}

/// Customer pays a business (`c2bPayment/singleStage/`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct C2bPayment {
    #[serde(rename = "input_Amount")]
    pub amount: String,
    #[serde(rename = "input_Country")]
    pub country: String,
    #[serde(rename = "input_Currency")]
    pub currency: String,
    #[serde(rename = "input_CustomerMSISDN")]
    pub customer_msisdn: String,
    #[serde(rename = "input_ServiceProviderCode")]
    pub service_provider_code: String,
    #[serde(rename = "input_ThirdPartyConversationID")]
    pub third_party_conversation_id: String,
    #[serde(rename = "input_TransactionReference")]
    pub transaction_reference: String,
    #[serde(rename = "input_PurchasedItemsDesc")]
    pub purchased_items_desc: String,
}

/// Business pays a business (`b2bPayment/`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct B2bPayment {
    #[serde(rename = "input_Amount")]
    pub amount: String,
    #[serde(rename = "input_Country")]
    pub country: String,
    #[serde(rename = "input_Currency")]
    pub currency: String,
    #[serde(rename = "input_PrimaryPartyCode")]
    pub primary_party_code: String,
    #[serde(rename = "input_ReceiverPartyCode")]
    pub receiver_party_code: String,
    #[serde(rename = "input_ThirdPartyConversationID")]
    pub third_party_conversation_id: String,
    #[serde(rename = "input_TransactionReference")]
    pub transaction_reference: String,
    #[serde(rename = "input_PurchasedItemsDesc")]
    pub purchased_items_desc: String,
}

/// Business pays a customer (`b2cPayment/`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct B2cPayment {
    #[serde(rename = "input_Amount")]
    pub amount: String,
    #[serde(rename = "input_Country")]
    pub country: String,
    #[serde(rename = "input_Currency")]
    pub currency: String,
    #[serde(rename = "input_CustomerMSISDN")]
    pub customer_msisdn: String,
    #[serde(rename = "input_ServiceProviderCode")]
    pub service_provider_code: String,
    #[serde(rename = "input_ThirdPartyConversationID")]
    pub third_party_conversation_id: String,
    #[serde(rename = "input_TransactionReference")]
    pub transaction_reference: String,
    #[serde(rename = "input_PaymentItemsDesc")]
    pub payment_items_desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reversal {
    #[serde(rename = "input_ReversalAmount")]
    pub reversal_amount: String,
    #[serde(rename = "input_Country")]
    pub country: String,
    #[serde(rename = "input_ServiceProviderCode")]
    pub service_provider_code: String,
    #[serde(rename = "input_ThirdPartyConversationID")]
    pub third_party_conversation_id: String,
    #[serde(rename = "input_TransactionID")]
    pub transaction_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "input_QueryReference")]
    pub query_reference: String,
    #[serde(rename = "input_Country")]
    pub country: String,
    #[serde(rename = "input_ServiceProviderCode")]
    pub service_provider_code: String,
    #[serde(rename = "input_ThirdPartyConversationID")]
    pub third_party_conversation_id: String,
}

/// Mandate creation (`directDebitCreation/`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectDebitCreate {
    #[serde(rename = "input_AgreedTC")]
    pub agreed_tc: String,
    #[serde(rename = "input_Country")]
    pub country: String,
    #[serde(rename = "input_CustomerMSISDN")]
    pub customer_msisdn: String,
    #[serde(rename = "input_ServiceProviderCode")]
    pub service_provider_code: String,
    #[serde(rename = "input_ThirdPartyConversationID")]
    pub third_party_conversation_id: String,
    #[serde(rename = "input_ThirdPartyReference")]
    pub third_party_reference: String,
    #[serde(rename = "input_StartRangeOfDays", skip_serializing_if = "Option::is_none")]
    pub start_range_of_days: Option<String>,
    #[serde(rename = "input_EndRangeOfDays", skip_serializing_if = "Option::is_none")]
    pub end_range_of_days: Option<String>,
    #[serde(rename = "input_ExpiryDate", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(rename = "input_FirstPaymentDate", skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<String>,
    #[serde(rename = "input_Frequency", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

/// Debit under an existing mandate (`directDebitPayment/`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectDebitPayment {
    #[serde(rename = "input_Amount")]
    pub amount: String,
    #[serde(rename = "input_Country")]
    pub country: String,
    #[serde(rename = "input_Currency")]
    pub currency: String,
    #[serde(rename = "input_CustomerMSISDN")]
    pub customer_msisdn: String,
    #[serde(rename = "input_ServiceProviderCode")]
    pub service_provider_code: String,
    #[serde(rename = "input_ThirdPartyConversationID")]
    pub third_party_conversation_id: String,
    #[serde(rename = "input_ThirdPartyReference")]
    pub third_party_reference: String,
    #[serde(rename = "input_MandateID", skip_serializing_if = "Option::is_none")]
    pub mandate_id: Option<String>,
}
