//! Callback token codec
//!
//! Every inline button carries a token describing the screen it leads to. The
//! token layout is part of the bot's wire contract: buttons rendered by an older
//! process stay pressable, so the table below must never change for an existing
//! version byte.
//!
//! ```text
//! offset  width  content
//! 0       1      version, currently '1'
//! 1       1      kind tag (c catalog, k cart, p profile, l language, m currency, a admin)
//! 2       1      level, one base-36 digit
//! 3       ...    the kind's fields, in schema order, each fixed width
//! ```
//!
//! Field encodings:
//!
//! * id (`category_id`, `subcategory_id`, `target_id`): 7 lowercase base-36 digits
//! * small (`quantity`, `page`): 4 lowercase base-36 digits
//! * flag (`confirmation`): `1` / `0`
//! * code (`code`): 1 to 5 chars of `[A-Za-z0-9-]`, right padded with `_`
//!
//! An absent field is written as `_` repeated over the field's width.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current wire version
pub const TOKEN_VERSION: char = '1';

/// Telegram's `callback_data` limit
pub const MAX_TOKEN_LEN: usize = 64;

/// Highest level a single base-36 digit can carry
pub const MAX_LEVEL: u8 = 35;

const HEADER_LEN: usize = 3;
const ID_WIDTH: usize = 7;
const SMALL_WIDTH: usize = 4;
const FLAG_WIDTH: usize = 1;
const CODE_WIDTH: usize = 5;
const ABSENT: u8 = b'_';

/// Screen families a token can point into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NavKind {
    Catalog,
    Cart,
    Profile,
    Language,
    Currency,
    Admin,
}

impl NavKind {
    pub const ALL: [NavKind; 6] = [
        NavKind::Catalog,
        NavKind::Cart,
        NavKind::Profile,
        NavKind::Language,
        NavKind::Currency,
        NavKind::Admin,
    ];

    /// Single-byte tag written at offset 1
    pub fn tag(self) -> u8 {
        match self {
            NavKind::Catalog => b'c',
            NavKind::Cart => b'k',
            NavKind::Profile => b'p',
            NavKind::Language => b'l',
            NavKind::Currency => b'm',
            NavKind::Admin => b'a',
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn name(self) -> &'static str {
        match self {
            NavKind::Catalog => "catalog",
            NavKind::Cart => "cart",
            NavKind::Profile => "profile",
            NavKind::Language => "language",
            NavKind::Currency => "currency",
            NavKind::Admin => "admin",
        }
    }

    /// Field slots carried by this kind, in wire order
    pub fn schema(self) -> &'static [Field] {
        match self {
            NavKind::Catalog => &[
                Field::CategoryId,
                Field::SubcategoryId,
                Field::Quantity,
                Field::Page,
                Field::Confirmation,
            ],
            NavKind::Cart => &[Field::TargetId, Field::Page, Field::Confirmation],
            NavKind::Profile => &[Field::TargetId, Field::Page],
            NavKind::Language | NavKind::Currency => &[Field::Code],
            NavKind::Admin => &[Field::Code, Field::Page],
        }
    }

    /// Exact token length for this kind
    pub fn token_len(self) -> usize {
        HEADER_LEN + self.schema().iter().map(|field| field.width()).sum::<usize>()
    }
}

impl fmt::Display for NavKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Argument slots a token may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CategoryId,
    SubcategoryId,
    Quantity,
    Page,
    TargetId,
    Confirmation,
    Code,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::CategoryId => "category_id",
            Field::SubcategoryId => "subcategory_id",
            Field::Quantity => "quantity",
            Field::Page => "page",
            Field::TargetId => "target_id",
            Field::Confirmation => "confirmation",
            Field::Code => "code",
        }
    }

    fn width(self) -> usize {
        match self {
            Field::CategoryId | Field::SubcategoryId | Field::TargetId => ID_WIDTH,
            Field::Quantity | Field::Page => SMALL_WIDTH,
            Field::Confirmation => FLAG_WIDTH,
            Field::Code => CODE_WIDTH,
        }
    }

    fn is_set(self, args: &NavArgs) -> bool {
        match self {
            Field::CategoryId => args.category_id.is_some(),
            Field::SubcategoryId => args.subcategory_id.is_some(),
            Field::Quantity => args.quantity.is_some(),
            Field::Page => args.page.is_some(),
            Field::TargetId => args.target_id.is_some(),
            Field::Confirmation => args.confirmation.is_some(),
            Field::Code => args.code.is_some(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Contextual arguments of a navigation step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavArgs {
    pub category_id: Option<u32>,
    pub subcategory_id: Option<u32>,
    pub quantity: Option<u16>,
    pub page: Option<u16>,
    pub target_id: Option<u32>,
    pub confirmation: Option<bool>,
    pub code: Option<String>,
}

impl NavArgs {
    pub fn category(category_id: u32) -> Self {
        Self {
            category_id: Some(category_id),
            ..Default::default()
        }
    }

    pub fn page(page: u16) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    pub fn target(target_id: u32) -> Self {
        Self {
            target_id: Some(target_id),
            ..Default::default()
        }
    }

    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn with_page(mut self, page: u16) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_subcategory(mut self, subcategory_id: u32) -> Self {
        self.subcategory_id = Some(subcategory_id);
        self
    }

    pub fn with_quantity(mut self, quantity: u16) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_confirmation(mut self, confirmation: bool) -> Self {
        self.confirmation = Some(confirmation);
        self
    }
}

/// A decoded callback token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationAction {
    pub kind: NavKind,
    pub level: u8,
    pub args: NavArgs,
}

impl NavigationAction {
    pub fn new(kind: NavKind, level: u8, args: NavArgs) -> Self {
        Self { kind, level, args }
    }

    /// Level 0 of a family with no arguments
    pub fn entry(kind: NavKind) -> Self {
        Self::new(kind, 0, NavArgs::default())
    }

    pub fn encode(&self) -> Result<CallbackToken, EncodeError> {
        encode(self)
    }

    /// Current page, defaulting to the first
    pub fn page(&self) -> u16 {
        self.args.page.unwrap_or(0)
    }
}

/// Encoded button payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallbackToken(String);

impl CallbackToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CallbackToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reasons an action cannot be turned into a token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("level {level} exceeds the encodable maximum of 35")]
    LevelOutOfRange { level: u8 },

    #[error("field {field} is not part of the {kind} schema")]
    FieldNotInSchema { kind: NavKind, field: Field },

    #[error("code {code:?} must be 1 to 5 characters of [A-Za-z0-9-]")]
    InvalidCode { code: String },

    #[error("token is {len} bytes, above the 64 byte limit")]
    TooLong { len: usize },
}

/// Reasons a string is not a valid token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty callback token")]
    Empty,

    #[error("callback token contains non-ASCII bytes")]
    NotAscii,

    #[error("unsupported token version {0:?}")]
    UnknownVersion(char),

    #[error("callback token truncated after {0} bytes")]
    Truncated(usize),

    #[error("unknown navigation kind tag {0:?}")]
    UnknownKind(char),

    #[error("invalid level digit {0:?}")]
    InvalidLevel(char),

    #[error("{kind} token must be {expected} bytes, got {found}")]
    ArityMismatch {
        kind: NavKind,
        expected: usize,
        found: usize,
    },

    #[error("invalid value {value:?} for field {field}")]
    InvalidField { field: Field, value: String },
}

/// Encode an action into its wire token
pub fn encode(action: &NavigationAction) -> Result<CallbackToken, EncodeError> {
    let kind = action.kind;
    if action.level > MAX_LEVEL {
        return Err(EncodeError::LevelOutOfRange {
            level: action.level,
        });
    }

    let schema = kind.schema();
    for field in ALL_FIELDS {
        if field.is_set(&action.args) && !schema.contains(&field) {
            return Err(EncodeError::FieldNotInSchema { kind, field });
        }
    }

    let mut token = String::with_capacity(kind.token_len());
    token.push(TOKEN_VERSION);
    token.push(kind.tag() as char);
    token.push(base36_digit(action.level));

    let args = &action.args;
    for field in schema {
        match field {
            Field::CategoryId => push_number(&mut token, args.category_id.map(u64::from), ID_WIDTH),
            Field::SubcategoryId => push_number(&mut token, args.subcategory_id.map(u64::from), ID_WIDTH),
            Field::TargetId => push_number(&mut token, args.target_id.map(u64::from), ID_WIDTH),
            Field::Quantity => push_number(&mut token, args.quantity.map(u64::from), SMALL_WIDTH),
            Field::Page => push_number(&mut token, args.page.map(u64::from), SMALL_WIDTH),
            Field::Confirmation => token.push(match args.confirmation {
                Some(true) => '1',
                Some(false) => '0',
                None => ABSENT as char,
            }),
            Field::Code => push_code(&mut token, args.code.as_deref())?,
        }
    }

    if token.len() > MAX_TOKEN_LEN {
        return Err(EncodeError::TooLong { len: token.len() });
    }

    Ok(CallbackToken(token))
}

/// Decode a raw callback payload
pub fn decode(raw: &str) -> Result<NavigationAction, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::Empty);
    }
    if !raw.is_ascii() {
        return Err(DecodeError::NotAscii);
    }

    let bytes = raw.as_bytes();
    if bytes[0] as char != TOKEN_VERSION {
        return Err(DecodeError::UnknownVersion(bytes[0] as char));
    }

    let tag = *bytes.get(1).ok_or(DecodeError::Truncated(bytes.len()))?;
    let kind = NavKind::from_tag(tag).ok_or(DecodeError::UnknownKind(tag as char))?;

    if bytes.len() != kind.token_len() {
        return Err(DecodeError::ArityMismatch {
            kind,
            expected: kind.token_len(),
            found: bytes.len(),
        });
    }

    let level = parse_level(bytes[2])?;

    let mut args = NavArgs::default();
    let mut offset = HEADER_LEN;
    for &field in kind.schema() {
        let width = field.width();
        // ASCII-only input, so byte offsets are char boundaries
        let slot = &raw[offset..offset + width];
        offset += width;

        match field {
            Field::CategoryId => args.category_id = parse_number(field, slot)?,
            Field::SubcategoryId => args.subcategory_id = parse_number(field, slot)?,
            Field::TargetId => args.target_id = parse_number(field, slot)?,
            Field::Quantity => args.quantity = parse_number(field, slot)?,
            Field::Page => args.page = parse_number(field, slot)?,
            Field::Confirmation => {
                args.confirmation = match slot {
                    "1" => Some(true),
                    "0" => Some(false),
                    "_" => None,
                    _ => return Err(invalid(field, slot)),
                }
            }
            Field::Code => args.code = parse_code(slot)?,
        }
    }

    Ok(NavigationAction { kind, level, args })
}

const ALL_FIELDS: [Field; 7] = [
    Field::CategoryId,
    Field::SubcategoryId,
    Field::Quantity,
    Field::Page,
    Field::TargetId,
    Field::Confirmation,
    Field::Code,
];

fn base36_digit(value: u8) -> char {
    std::char::from_digit(u32::from(value), 36).unwrap_or('_')
}

fn parse_level(byte: u8) -> Result<u8, DecodeError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'z' => Ok(byte - b'a' + 10),
        _ => Err(DecodeError::InvalidLevel(byte as char)),
    }
}

fn push_number(token: &mut String, value: Option<u64>, width: usize) {
    match value {
        Some(mut value) => {
            let mut digits = vec![b'0'; width];
            for slot in digits.iter_mut().rev() {
                *slot = base36_digit((value % 36) as u8) as u8;
                value /= 36;
            }
            token.extend(digits.into_iter().map(char::from));
        }
        None => token.extend(std::iter::repeat(ABSENT as char).take(width)),
    }
}

fn push_code(token: &mut String, code: Option<&str>) -> Result<(), EncodeError> {
    match code {
        Some(code) => {
            if !is_valid_code(code) {
                return Err(EncodeError::InvalidCode {
                    code: code.to_string(),
                });
            }
            token.push_str(code);
            token.extend(std::iter::repeat(ABSENT as char).take(CODE_WIDTH - code.len()));
        }
        None => token.extend(std::iter::repeat(ABSENT as char).take(CODE_WIDTH)),
    }
    Ok(())
}

/// Codes are language or currency identifiers such as `de`, `pt-BR` or `USD`
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= CODE_WIDTH
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

fn parse_number<T: TryFrom<u64>>(field: Field, slot: &str) -> Result<Option<T>, DecodeError> {
    if slot.bytes().all(|b| b == ABSENT) {
        return Ok(None);
    }
    // from_str_radix alone would accept uppercase digits and a leading '+'
    if !slot
        .bytes()
        .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
    {
        return Err(invalid(field, slot));
    }
    let value = u64::from_str_radix(slot, 36).map_err(|_| invalid(field, slot))?;
    T::try_from(value).map(Some).map_err(|_| invalid(field, slot))
}

fn parse_code(slot: &str) -> Result<Option<String>, DecodeError> {
    let code = slot.trim_end_matches(ABSENT as char);
    if code.is_empty() {
        return Ok(None);
    }
    if !is_valid_code(code) {
        return Err(invalid(Field::Code, slot));
    }
    Ok(Some(code.to_string()))
}

fn invalid(field: Field, slot: &str) -> DecodeError {
    DecodeError::InvalidField {
        field,
        value: slot.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn catalog(level: u8, args: NavArgs) -> NavigationAction {
        NavigationAction::new(NavKind::Catalog, level, args)
    }

    #[test]
    fn test_catalog_entry_layout() {
        let token = encode(&NavigationAction::entry(NavKind::Catalog)).unwrap();
        assert_eq!(token.as_str(), "1c0_______________________");
        assert_eq!(token.as_str().len(), NavKind::Catalog.token_len());
    }

    #[test]
    fn test_category_field_is_fixed_width_base36() {
        let token = encode(&catalog(1, NavArgs::category(7))).unwrap();
        assert_eq!(token.as_str(), "1c10000007________________");

        let token = encode(&catalog(2, NavArgs::category(36).with_subcategory(u32::MAX))).unwrap();
        assert_eq!(&token.as_str()[3..10], "0000010");
        assert_eq!(&token.as_str()[10..17], "1z141z3");
    }

    #[test]
    fn test_code_is_right_padded() {
        let action = NavigationAction::new(NavKind::Currency, 1, NavArgs::code("EUR"));
        let token = encode(&action).unwrap();
        assert_eq!(token.as_str(), "1m1EUR__");
        assert_eq!(decode(token.as_str()).unwrap(), action);
    }

    #[test]
    fn test_every_kind_fits_the_payload_limit() {
        for kind in NavKind::ALL {
            assert!(kind.token_len() <= MAX_TOKEN_LEN, "{kind} too long");
        }
    }

    #[test]
    fn test_encode_rejects_foreign_fields() {
        let action = NavigationAction::new(NavKind::Language, 0, NavArgs::category(1));
        assert_matches!(
            encode(&action),
            Err(EncodeError::FieldNotInSchema { kind: NavKind::Language, field: Field::CategoryId })
        );
    }

    #[test]
    fn test_encode_rejects_bad_level_and_code() {
        assert_matches!(
            encode(&catalog(36, NavArgs::default())),
            Err(EncodeError::LevelOutOfRange { level: 36 })
        );
        let action = NavigationAction::new(NavKind::Language, 1, NavArgs::code("en_US"));
        assert_matches!(encode(&action), Err(EncodeError::InvalidCode { .. }));
        let action = NavigationAction::new(NavKind::Language, 1, NavArgs::code(""));
        assert_matches!(encode(&action), Err(EncodeError::InvalidCode { .. }));
    }

    #[test]
    fn test_decode_errors() {
        assert_matches!(decode(""), Err(DecodeError::Empty));
        assert_matches!(decode("1cé"), Err(DecodeError::NotAscii));
        assert_matches!(decode("2c0"), Err(DecodeError::UnknownVersion('2')));
        assert_matches!(decode("1x0_____"), Err(DecodeError::UnknownKind('x')));
        assert_matches!(decode("1"), Err(DecodeError::Truncated(1)));
        assert_matches!(
            decode("1c0"),
            Err(DecodeError::ArityMismatch { kind: NavKind::Catalog, expected: 26, found: 3 })
        );
        assert_matches!(decode("1l!en___"), Err(DecodeError::InvalidLevel('!')));
        assert_matches!(
            decode("1c1000000A________________"),
            Err(DecodeError::InvalidField { field: Field::CategoryId, .. })
        );
        assert_matches!(
            decode("1c1+000007________________"),
            Err(DecodeError::InvalidField { field: Field::CategoryId, .. })
        );
        assert_matches!(
            decode("1k3_______0000x"),
            Err(DecodeError::InvalidField { field: Field::Confirmation, .. })
        );
        assert_matches!(
            decode("1l1e_n__"),
            Err(DecodeError::InvalidField { field: Field::Code, .. })
        );
    }

    #[test]
    fn test_decode_rejects_overflowing_small_field() {
        // "zzzz" is 1_679_615, above u16::MAX
        assert_matches!(
            decode("1p1_______zzzz"),
            Err(DecodeError::InvalidField { field: Field::Page, .. })
        );
    }

    #[test]
    fn test_partially_absent_number_is_invalid() {
        assert_matches!(
            decode("1c1___0007________________"),
            Err(DecodeError::InvalidField { field: Field::CategoryId, .. })
        );
    }

    fn code_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z0-9-]{1,5}"
    }

    fn action_strategy() -> impl Strategy<Value = NavigationAction> {
        let kind = prop::sample::select(NavKind::ALL.to_vec());
        (
            kind,
            0..=MAX_LEVEL,
            prop::option::of(any::<u32>()),
            prop::option::of(any::<u32>()),
            prop::option::of(any::<u16>()),
            prop::option::of(any::<u16>()),
            prop::option::of(any::<u32>()),
            prop::option::of(any::<bool>()),
            prop::option::of(code_strategy()),
        )
            .prop_map(
                |(kind, level, category_id, subcategory_id, quantity, page, target_id, confirmation, code)| {
                    let schema = kind.schema();
                    let keep = |field: Field| schema.contains(&field);
                    let args = NavArgs {
                        category_id: category_id.filter(|_| keep(Field::CategoryId)),
                        subcategory_id: subcategory_id.filter(|_| keep(Field::SubcategoryId)),
                        quantity: quantity.filter(|_| keep(Field::Quantity)),
                        page: page.filter(|_| keep(Field::Page)),
                        target_id: target_id.filter(|_| keep(Field::TargetId)),
                        confirmation: confirmation.filter(|_| keep(Field::Confirmation)),
                        code: code.filter(|_| keep(Field::Code)),
                    };
                    NavigationAction::new(kind, level, args)
                },
            )
    }

    proptest! {
        #[test]
        fn prop_round_trip(action in action_strategy()) {
            let token = encode(&action).unwrap();
            prop_assert_eq!(decode(token.as_str()).unwrap(), action);
        }

        #[test]
        fn prop_deterministic_and_bounded(action in action_strategy()) {
            let first = encode(&action).unwrap();
            let second = encode(&action.clone()).unwrap();
            prop_assert!(first.as_str().len() <= MAX_TOKEN_LEN);
            prop_assert_eq!(first.as_str().len(), action.kind.token_len());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_decoded_tokens_reencode_identically(action in action_strategy(), index in any::<prop::sample::Index>(), byte in any::<u8>()) {
            let token = encode(&action).unwrap().into_string();
            let mut bytes = token.into_bytes();
            let at = index.index(bytes.len());
            bytes[at] = byte;
            let mutated = String::from_utf8_lossy(&bytes).into_owned();
            if let Ok(decoded) = decode(&mutated) {
                let reencoded = encode(&decoded).unwrap();
                prop_assert_eq!(reencoded.as_str(), mutated.as_str());
            }
        }

        #[test]
        fn prop_truncation_never_panics(action in action_strategy(), cut in any::<prop::sample::Index>()) {
            let token = encode(&action).unwrap().into_string();
            let truncated = &token[..cut.index(token.len())];
            prop_assert!(decode(truncated).is_err());
        }

        #[test]
        fn prop_arbitrary_input_never_panics(raw in ".{0,80}") {
            let _ = decode(&raw);
        }
    }
}
