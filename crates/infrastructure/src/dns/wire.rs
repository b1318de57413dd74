use autoptr6_domain::{DomainError, PtrAnswer, PtrQuery, QueryType, Transport};
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::PTR;
use hickory_proto::rr::{Name, RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::SocketAddr;

const HEADER_LEN: usize = 12;
const QR_BIT: u8 = 0x80;
const OPCODE_MASK: u8 = 0x78;
const RD_BIT: u8 = 0x01;

/// Largest UDP response sent to a client without EDNS.
pub const UDP_MAX_RESPONSE: usize = 512;

/// A request that parsed cleanly and carries exactly one question.
#[derive(Debug, Clone)]
pub struct DecodedRequest {
    pub message: Message,
    pub query: PtrQuery,
}

/// Why a payload did not become a [`DecodedRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing usable came in; stay silent.
    Drop(&'static str),
    /// The header was readable, answer with this error response.
    Respond {
        response: Vec<u8>,
        reason: &'static str,
    },
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::Drop(reason) => reason,
            Rejection::Respond { reason, .. } => reason,
        }
    }
}

/// Parses one DNS message into a [`PtrQuery`].
pub fn decode_request(
    payload: &[u8],
    transport: Transport,
    client: SocketAddr,
) -> Result<DecodedRequest, Rejection> {
    let message = match Message::from_vec(payload) {
        Ok(message) => message,
        Err(_) => {
            return Err(match raw_error_response(payload, ResponseCode::FormErr) {
                Some(response) => Rejection::Respond {
                    response,
                    reason: "unparsable message",
                },
                None => Rejection::Drop("unparsable message"),
            });
        }
    };

    if message.message_type() != MessageType::Query {
        return Err(Rejection::Drop("not a query"));
    }

    if message.op_code() != OpCode::Query {
        return Err(respond(&message, ResponseCode::NotImp, "unsupported opcode"));
    }

    let [question] = message.queries() else {
        return Err(respond(&message, ResponseCode::FormErr, "question count is not one"));
    };

    let mut name = question.name().to_ascii();
    if !name.ends_with('.') {
        name.push('.');
    }
    let query_type = QueryType::from_code(u16::from(question.query_type()));
    let query = PtrQuery::new(name, query_type, transport, client);

    Ok(DecodedRequest { message, query })
}

/// Encodes the answer (or error) for `request`.
///
/// Responses larger than `max_len` are replaced by an empty, truncated
/// response so the client retries over TCP.
pub fn encode_response(
    request: &Message,
    outcome: &Result<PtrAnswer, DomainError>,
    max_len: usize,
) -> Result<Vec<u8>, DomainError> {
    let response = match outcome {
        Ok(answer) => answer_response(request, answer)?,
        Err(e) => response_header(request, response_code_for(e)),
    };

    let bytes = serialize(&response)?;
    if bytes.len() <= max_len {
        return Ok(bytes);
    }

    let mut truncated = response_header(request, response.response_code());
    truncated.set_truncated(true);
    serialize(&truncated)
}

/// Maps a resolution failure to the DNS response code sent back.
pub fn response_code_for(error: &DomainError) -> ResponseCode {
    match error {
        DomainError::UnsupportedRecordType(_) => ResponseCode::NoError,
        DomainError::NoMatch(_) => ResponseCode::NXDomain,
        DomainError::MalformedQuery(_) => ResponseCode::FormErr,
        DomainError::QueueFull => ResponseCode::Refused,
        _ => ResponseCode::ServFail,
    }
}

fn answer_response(request: &Message, answer: &PtrAnswer) -> Result<Message, DomainError> {
    let mut response = response_header(request, ResponseCode::NoError);

    let Some(question) = request.queries().first() else {
        return Err(DomainError::InternalFault(
            "Answer built for a request without a question".to_string(),
        ));
    };

    let target = Name::from_ascii(&*answer.hostname).map_err(|e| {
        DomainError::InvalidDomainName(format!("Invalid PTR target '{}': {}", answer.hostname, e))
    })?;

    response.add_answer(Record::from_rdata(
        question.name().clone(),
        answer.ttl,
        RData::PTR(PTR(target)),
    ));

    Ok(response)
}

fn response_header(request: &Message, code: ResponseCode) -> Message {
    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_authoritative(true)
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(false)
        .set_response_code(code);
    for question in request.queries() {
        response.add_query(question.clone());
    }
    response
}

fn respond(request: &Message, code: ResponseCode, reason: &'static str) -> Rejection {
    match serialize(&response_header(request, code)) {
        Ok(response) => Rejection::Respond { response, reason },
        Err(_) => Rejection::Drop(reason),
    }
}

fn serialize(message: &Message) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(UDP_MAX_RESPONSE);
    let mut encoder = BinEncoder::new(&mut buf);

    message.emit(&mut encoder).map_err(|e| {
        DomainError::InternalFault(format!("Failed to serialize DNS message: {}", e))
    })?;

    Ok(buf)
}

/// Header-only error response built from raw bytes, for messages hickory
/// could not parse. Returns `None` when there is no full header or the
/// packet is itself a response.
fn raw_error_response(payload: &[u8], code: ResponseCode) -> Option<Vec<u8>> {
    if payload.len() < HEADER_LEN || payload[2] & QR_BIT != 0 {
        return None;
    }

    let mut buf = vec![0u8; HEADER_LEN];
    buf[0] = payload[0];
    buf[1] = payload[1];
    buf[2] = QR_BIT | (payload[2] & OPCODE_MASK) | (payload[2] & RD_BIT);
    buf[3] = u16::from(code) as u8 & 0x0F;
    Some(buf)
}
