use crate::error::{Error, Result};
use crate::utils::join_numbers;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const LOWEST_NUMBER: u8 = 1;
pub const HIGHEST_NUMBER: u8 = 45;
pub const NUMBERS_PER_TICKET: usize = 6;

const DEFAULT_FAILURE_MESSAGE: &str = "서버가 요청을 처리하지 못했습니다.";

/// Outcome of a call the server answered: either the payload or the
/// server's own failure message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Success(T),
    Failure(String),
}

fn failure_message(message: Option<String>) -> String {
    match message {
        Some(m) if !m.trim().is_empty() => m,
        _ => DEFAULT_FAILURE_MESSAGE.to_string(),
    }
}

fn missing(field: &str) -> Error {
    Error::Parse(format!("successful draw reply is missing '{}'", field))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DrawNo(u32);

impl DrawNo {
    pub fn new(value: u32) -> Result<Self> {
        if value == 0 {
            return Err(Error::InvalidArgument(
                "draw number must be at least 1".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Parses user-entered text such as `" 1100 "`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let value = trimmed.parse::<u32>().map_err(|_| {
            Error::InvalidArgument(format!("'{}' is not a draw number", trimmed))
        })?;
        Self::new(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DrawNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstPrize {
    pub amount: u64,
    pub winners: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawResult {
    pub draw_no: u32,
    pub draw_date: String,
    pub numbers: Vec<u32>,
    pub bonus_number: u32,
    pub first_prize: Option<FirstPrize>,
}

/// Body of `/lotto/{n}` and `/lotto/latest`. The server sometimes wraps the
/// draw in a `data` envelope, so the same shape nests.
#[derive(Deserialize, Debug, Default)]
pub struct DrawResponse {
    #[serde(default)]
    pub success: bool,
    pub draw_no: Option<u32>,
    pub draw_date: Option<String>,
    pub draw_numbers: Option<Vec<u32>>,
    pub bonus_number: Option<u32>,
    pub prize_1st: Option<u64>,
    pub prize_1st_winners: Option<u64>,
    pub message: Option<String>,
    pub data: Option<Box<DrawResponse>>,
}

impl DrawResponse {
    pub fn into_reply(self) -> Result<Reply<DrawResult>> {
        if !self.success {
            return Ok(Reply::Failure(failure_message(self.message)));
        }
        if let Some(inner) = self.data {
            return inner.into_reply();
        }

        let first_prize = match (self.prize_1st, self.prize_1st_winners) {
            (Some(amount), Some(winners)) => Some(FirstPrize { amount, winners }),
            _ => None,
        };

        Ok(Reply::Success(DrawResult {
            draw_no: self.draw_no.ok_or_else(|| missing("draw_no"))?,
            draw_date: self.draw_date.ok_or_else(|| missing("draw_date"))?,
            numbers: self.draw_numbers.ok_or_else(|| missing("draw_numbers"))?,
            bonus_number: self.bonus_number.ok_or_else(|| missing("bonus_number"))?,
            first_prize,
        }))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumbersField {
    Text(String),
    List(Vec<u32>),
}

fn numbers_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumbersField::deserialize(deserializer)? {
        NumbersField::Text(text) => text,
        NumbersField::List(numbers) => join_numbers(&numbers),
    })
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DrawListEntry {
    pub date: String,
    #[serde(deserialize_with = "numbers_text")]
    pub numbers: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct DrawListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub draws: Vec<DrawListEntry>,
    pub message: Option<String>,
}

impl DrawListResponse {
    pub fn into_reply(self) -> Reply<Vec<DrawListEntry>> {
        if self.success {
            Reply::Success(self.draws)
        } else {
            Reply::Failure(failure_message(self.message))
        }
    }
}

/// `{ success, message }` as returned by the mutating endpoints.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ApiMessage {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

impl ApiMessage {
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.message.as_deref() {
            Some(m) if !m.trim().is_empty() => m,
            _ => fallback,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CouponRedemption {
    pub coupon_code: String,
    pub youtube_hashtag: String,
}

impl CouponRedemption {
    pub fn new(coupon_code: &str, youtube_hashtag: &str) -> Result<Self> {
        let coupon_code = coupon_code.trim();
        let youtube_hashtag = youtube_hashtag.trim();
        if coupon_code.is_empty() {
            return Err(Error::InvalidArgument("coupon code is empty".to_string()));
        }
        if youtube_hashtag.is_empty() {
            return Err(Error::InvalidArgument("hashtag is empty".to_string()));
        }
        Ok(Self {
            coupon_code: coupon_code.to_string(),
            youtube_hashtag: youtube_hashtag.to_string(),
        })
    }
}

/// Six distinct numbers between 1 and 45, in the order they were picked.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct LottoNumbers(Vec<u8>);

impl LottoNumbers {
    pub fn new(numbers: Vec<u8>) -> Result<Self> {
        if numbers.len() != NUMBERS_PER_TICKET {
            return Err(Error::InvalidArgument(format!(
                "expected {} numbers, got {}",
                NUMBERS_PER_TICKET,
                numbers.len()
            )));
        }
        if let Some(n) = numbers
            .iter()
            .find(|n| !(LOWEST_NUMBER..=HIGHEST_NUMBER).contains(*n))
        {
            return Err(Error::InvalidArgument(format!(
                "{} is outside {}..={}",
                n, LOWEST_NUMBER, HIGHEST_NUMBER
            )));
        }
        let distinct: HashSet<_> = numbers.iter().collect();
        if distinct.len() != numbers.len() {
            return Err(Error::InvalidArgument(
                "numbers must not repeat".to_string(),
            ));
        }
        Ok(Self(numbers))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CouponSubmission {
    pub coupon_code: String,
    pub youtube_hashtag: String,
    pub selected_numbers: LottoNumbers,
}

impl CouponSubmission {
    pub fn new(coupon_code: &str, youtube_hashtag: &str, numbers: Vec<u8>) -> Result<Self> {
        let CouponRedemption {
            coupon_code,
            youtube_hashtag,
        } = CouponRedemption::new(coupon_code, youtube_hashtag)?;
        Ok(Self {
            coupon_code,
            youtube_hashtag,
            selected_numbers: LottoNumbers::new(numbers)?,
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Coupon {
    pub id: i64,
    pub coupon_code: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct CouponListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
    pub message: Option<String>,
}

impl CouponListResponse {
    pub fn into_reply(self) -> Reply<Vec<Coupon>> {
        if self.success {
            Reply::Success(self.coupons)
        } else {
            Reply::Failure(failure_message(self.message))
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct CouponCreateResponse {
    #[serde(default)]
    pub success: bool,
    pub coupon_code: Option<String>,
    pub message: Option<String>,
}

impl CouponCreateResponse {
    pub fn into_reply(self) -> Result<Reply<String>> {
        if !self.success {
            return Ok(Reply::Failure(failure_message(self.message)));
        }
        self.coupon_code
            .map(Reply::Success)
            .ok_or_else(|| Error::Parse("created coupon reply is missing 'coupon_code'".to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberItem {
    Int(u32),
    Text(String),
}

fn number_items<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<NumberItem>::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .map(|item| match item {
            NumberItem::Int(n) => n.to_string(),
            NumberItem::Text(s) => s.trim().to_string(),
        })
        .collect())
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CouponUse {
    pub coupon_code: String,
    #[serde(default, deserialize_with = "number_items")]
    pub selected_numbers: Vec<String>,
    pub used_at: Option<String>,
    pub draw_no: Option<u32>,
    pub draw_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouponUses {
    pub uses: Vec<CouponUse>,
    pub used_count: u32,
}

#[derive(Deserialize, Debug, Default)]
pub struct CouponUsesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<CouponUse>,
    pub used_coupons_count: Option<u32>,
    pub message: Option<String>,
}

impl CouponUsesResponse {
    pub fn into_reply(self) -> Reply<CouponUses> {
        if !self.success {
            return Reply::Failure(failure_message(self.message));
        }
        let used_count = self.used_coupons_count.unwrap_or(self.data.len() as u32);
        Reply::Success(CouponUses {
            uses: self.data,
            used_count,
        })
    }
}
