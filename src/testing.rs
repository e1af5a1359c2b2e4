//! In-memory stand-ins for the API, the page and the confirmation dialog.

use crate::api::LottoApi;
use crate::error::{Error, Result};
use crate::render::Block;
use crate::types::{
    ApiMessage, Coupon, CouponRedemption, CouponSubmission, CouponUses, DrawListEntry, DrawNo,
    DrawResult, Reply,
};
use crate::view::{Confirm, Region, View};
use reqwest::StatusCode;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Draw(u32),
    LatestDraw,
    DeleteCoupon(String),
    HashtagDraws(String),
    RedeemCoupon {
        coupon_code: String,
        youtube_hashtag: String,
    },
    ListCoupons,
    CreateCoupon,
    CouponUses(String),
    SubmitCoupon {
        coupon_code: String,
        numbers: Vec<u8>,
    },
}

/// A canned transport failure.
#[derive(Debug, Clone, Copy)]
pub struct Fault;

type Canned<T> = Option<std::result::Result<T, Fault>>;

fn answer<T: Clone>(canned: &Canned<T>) -> Result<T> {
    match canned {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(Fault)) => Err(Error::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream unavailable".to_string(),
        }),
        None => Err(Error::Parse("no canned reply".to_string())),
    }
}

#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    delay: Option<Duration>,
    draw: Canned<Reply<DrawResult>>,
    draw_list: Canned<Reply<Vec<DrawListEntry>>>,
    message: Canned<ApiMessage>,
    coupons: Canned<Reply<Vec<Coupon>>>,
    created: Canned<Reply<String>>,
    uses: Canned<Reply<CouponUses>>,
}

impl FakeApi {
    pub fn transport_error() -> Fault {
        Fault
    }

    /// Answer for both the numbered and the latest draw.
    pub fn with_draw(mut self, reply: std::result::Result<Reply<DrawResult>, Fault>) -> Self {
        self.draw = Some(reply);
        self
    }

    pub fn with_draw_list(
        mut self,
        reply: std::result::Result<Reply<Vec<DrawListEntry>>, Fault>,
    ) -> Self {
        self.draw_list = Some(reply);
        self
    }

    /// Answer for deletion, redemption and submission.
    pub fn with_message(mut self, reply: std::result::Result<ApiMessage, Fault>) -> Self {
        self.message = Some(reply);
        self
    }

    pub fn with_coupons(mut self, reply: std::result::Result<Reply<Vec<Coupon>>, Fault>) -> Self {
        self.coupons = Some(reply);
        self
    }

    pub fn with_created(mut self, reply: std::result::Result<Reply<String>, Fault>) -> Self {
        self.created = Some(reply);
        self
    }

    pub fn with_uses(mut self, reply: std::result::Result<Reply<CouponUses>, Fault>) -> Self {
        self.uses = Some(reply);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl LottoApi for FakeApi {
    async fn draw(&self, draw_no: DrawNo) -> Result<Reply<DrawResult>> {
        self.record(Call::Draw(draw_no.get())).await;
        answer(&self.draw)
    }

    async fn latest_draw(&self) -> Result<Reply<DrawResult>> {
        self.record(Call::LatestDraw).await;
        answer(&self.draw)
    }

    async fn delete_coupon(&self, coupon_id: &str) -> Result<ApiMessage> {
        self.record(Call::DeleteCoupon(coupon_id.to_string())).await;
        answer(&self.message)
    }

    async fn hashtag_draws(&self, hashtag: &str) -> Result<Reply<Vec<DrawListEntry>>> {
        self.record(Call::HashtagDraws(hashtag.to_string())).await;
        answer(&self.draw_list)
    }

    async fn redeem_coupon(&self, redemption: &CouponRedemption) -> Result<ApiMessage> {
        self.record(Call::RedeemCoupon {
            coupon_code: redemption.coupon_code.clone(),
            youtube_hashtag: redemption.youtube_hashtag.clone(),
        })
        .await;
        answer(&self.message)
    }

    async fn list_coupons(&self) -> Result<Reply<Vec<Coupon>>> {
        self.record(Call::ListCoupons).await;
        answer(&self.coupons)
    }

    async fn create_coupon(&self) -> Result<Reply<String>> {
        self.record(Call::CreateCoupon).await;
        answer(&self.created)
    }

    async fn coupon_uses(&self, hashtag: &str) -> Result<Reply<CouponUses>> {
        self.record(Call::CouponUses(hashtag.to_string())).await;
        answer(&self.uses)
    }

    async fn submit_coupon(&self, submission: &CouponSubmission) -> Result<ApiMessage> {
        self.record(Call::SubmitCoupon {
            coupon_code: submission.coupon_code.clone(),
            numbers: submission.selected_numbers.as_slice().to_vec(),
        })
        .await;
        answer(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Render(Region, Block),
    Alert(String),
    Reload,
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<Event>,
}

impl RecordingView {
    /// Text currently shown in `region`.
    pub fn region_text(&self, region: Region) -> String {
        self.events
            .iter()
            .rev()
            .find_map(|event| match event {
                Event::Render(r, block) if *r == region => Some(block.to_text()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

impl View for RecordingView {
    fn render(&mut self, region: Region, block: Block) {
        self.events.push(Event::Render(region, block));
    }

    fn alert(&mut self, message: &str) {
        self.events.push(Event::Alert(message.to_string()));
    }

    fn reload(&mut self) {
        self.events.push(Event::Reload);
    }
}

pub struct ScriptedConfirm {
    answer: bool,
    pub prompts: Vec<String>,
}

impl ScriptedConfirm {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.answer
    }
}
