//! Blocks of text shown in a result region, with an HTML fragment form
//! (for embedding in the web page) and a plain-text form (for the terminal).

use crate::types::{Coupon, CouponUses, DrawListEntry, DrawResult};
use crate::utils::{escape_html, format_amount, join_numbers};
use chrono::NaiveDate;

pub const LOOKUP_FAILURE: &str = "당첨 결과를 불러오는 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";
pub const INVALID_DRAW_NO: &str = "회차 번호는 1 이상의 숫자로 입력해주세요.";
pub const HASHTAG_REQUIRED: &str = "유튜브 해시태그를 입력해주세요.";
pub const HASHTAG_INVALID: &str = "사용할 수 없는 해시태그입니다.";
pub const DRAWS_FAILURE: &str = "로또 추첨 기록을 불러오는 중 오류가 발생했습니다.";
pub const DELETE_FAILURE: &str = "쿠폰 삭제 요청 중 오류가 발생했습니다.";
pub const DELETE_DONE: &str = "쿠폰이 삭제되었습니다.";
pub const DELETE_REJECTED: &str = "쿠폰을 삭제하지 못했습니다.";
pub const COUPON_ID_REQUIRED: &str = "삭제할 쿠폰 ID를 입력해주세요.";
pub const REDEMPTION_FAILURE: &str = "쿠폰 사용 요청 중 오류가 발생했습니다.";
pub const REDEMPTION_DONE: &str = "쿠폰 사용 요청이 처리되었습니다.";
pub const REDEMPTION_REJECTED: &str = "쿠폰을 사용하지 못했습니다.";
pub const COUPON_CODE_REQUIRED: &str = "쿠폰 코드를 입력해주세요.";
pub const COUPONS_FAILURE: &str = "쿠폰 데이터를 불러올 수 없습니다.";
pub const COUPON_CREATE_FAILURE: &str = "쿠폰 생성 중 오류가 발생했습니다.";
pub const HANDLE_REQUIRED: &str = "유튜브 핸들을 입력해주세요.";
pub const SUBMIT_FAILURE: &str = "쿠폰 제출 중 오류가 발생했습니다.";
pub const SUBMIT_DONE: &str = "쿠폰이 제출되었습니다.";
pub const SUBMIT_REJECTED: &str = "쿠폰을 제출하지 못했습니다.";
pub const NUMBERS_INVALID: &str = "번호는 1부터 45 사이의 서로 다른 숫자 6개로 입력해주세요.";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub heading: Option<String>,
    pub lines: Vec<String>,
}

impl Block {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            heading: None,
            lines: vec![text.into()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heading.is_none() && self.lines.is_empty()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        if let Some(heading) = &self.heading {
            html.push_str(&format!("<h3>{}</h3>\n", escape_html(heading)));
        }
        for line in &self.lines {
            html.push_str(&format!("<p>{}</p>\n", escape_html(line)));
        }
        html
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        if let Some(heading) = &self.heading {
            text.push_str(heading);
            text.push('\n');
        }
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

pub fn draw_result(draw: &DrawResult) -> Block {
    let mut lines = vec![
        format!("추첨일: {}", draw.draw_date),
        format!("당첨 번호: {}", join_numbers(&draw.numbers)),
        format!("보너스 번호: {}", draw.bonus_number),
    ];
    if let Some(prize) = &draw.first_prize {
        lines.push(format!(
            "1등 당첨금: {}원 (당첨자 {}명)",
            format_amount(prize.amount),
            prize.winners
        ));
    }
    Block {
        heading: Some(format!("{}회 당첨 결과", draw.draw_no)),
        lines,
    }
}

pub fn error_message(message: &str) -> Block {
    Block::message(format!("오류: {}", message))
}

pub fn lookup_failure() -> Block {
    error_message(LOOKUP_FAILURE)
}

pub fn draw_list(draws: &[DrawListEntry]) -> Block {
    Block {
        heading: None,
        lines: draws
            .iter()
            .map(|draw| format!("{}: {}", draw.date, draw.numbers))
            .collect(),
    }
}

pub fn delete_prompt(coupon_id: &str) -> String {
    format!("쿠폰 ID {}을(를) 삭제하시겠습니까?", coupon_id)
}

pub fn next_draw(draw_no: u32, date: NaiveDate, estimated: bool) -> Block {
    let mut lines = vec![format!("추첨일: {}", date.format("%Y-%m-%d"))];
    if estimated {
        lines.push("최신 회차를 확인하지 못해 달력 기준으로 추정했습니다.".to_string());
    }
    Block {
        heading: Some(format!("다음 추첨: {}회", draw_no)),
        lines,
    }
}

/// Picks against a draw's winning numbers, in the order they were picked.
pub fn number_check(draw: &DrawResult, picks: &[u8]) -> Block {
    let matched: Vec<u32> = picks
        .iter()
        .map(|&n| u32::from(n))
        .filter(|n| draw.numbers.contains(n))
        .collect();
    let picked: Vec<u32> = picks.iter().map(|&n| u32::from(n)).collect();

    let mut lines = vec![
        format!("당첨 번호: {}", join_numbers(&draw.numbers)),
        format!("선택 번호: {}", join_numbers(&picked)),
    ];
    if matched.is_empty() {
        lines.push("일치 번호: 없음".to_string());
    } else {
        lines.push(format!(
            "일치 번호: {} ({}개)",
            join_numbers(&matched),
            matched.len()
        ));
    }
    if picked.contains(&draw.bonus_number) {
        lines.push(format!("보너스 번호 {} 일치", draw.bonus_number));
    }
    Block {
        heading: Some(format!("{}회 번호 확인", draw.draw_no)),
        lines,
    }
}

pub fn coupon_list(coupons: &[Coupon]) -> Block {
    if coupons.is_empty() {
        return Block::message("등록된 쿠폰이 없습니다.");
    }
    Block {
        heading: Some(format!("쿠폰 목록 ({}개)", coupons.len())),
        lines: coupons
            .iter()
            .map(|c| format!("#{} {}", c.id, c.coupon_code))
            .collect(),
    }
}

pub fn coupon_uses(hashtag: &str, uses: &CouponUses) -> Block {
    let heading = format!("{} 쿠폰 사용 내역 (총 {}개)", hashtag, uses.used_count);
    if uses.uses.is_empty() {
        return Block {
            heading: Some(heading),
            lines: vec!["사용 내역이 없습니다.".to_string()],
        };
    }
    let lines = uses
        .uses
        .iter()
        .map(|u| {
            let draw = match (u.draw_no, u.draw_date.as_deref()) {
                (Some(no), Some(date)) => format!("{}회 ({})", no, date),
                (Some(no), None) => format!("{}회", no),
                _ => "회차 미정".to_string(),
            };
            format!(
                "{} | {} | {} | {}",
                u.coupon_code,
                u.selected_numbers.join(", "),
                draw,
                u.used_at.as_deref().unwrap_or("-")
            )
        })
        .collect();
    Block {
        heading: Some(heading),
        lines,
    }
}
