use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

use crate::api::{LottoApi, is_path_segment};
use crate::error::Result;
use crate::render::{self, Block};
use crate::types::{
    CouponRedemption, CouponSubmission, DrawNo, DrawResult, LottoNumbers, Reply,
};
use crate::utils::{draw_date_of, estimate_latest_draw_no};
use crate::view::{Confirm, Region, View};

/// How a single user action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the request and the result was shown.
    Shown,
    /// The server answered with `success: false`.
    Rejected,
    /// Input was refused before any request was made.
    Invalid,
    /// Transport or decoding failure.
    Failed,
    /// The user declined the confirmation prompt.
    Declined,
    /// The previous request from the same control is still running.
    Busy,
}

impl Outcome {
    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Rejected | Outcome::Invalid | Outcome::Failed)
    }
}

/// Stands in for a disabled button: only one request per control at a time.
#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

pub struct InFlightToken<'a>(&'a AtomicBool);

impl InFlight {
    pub fn try_begin(&self) -> Option<InFlightToken<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| InFlightToken(&self.0))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for InFlightToken<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn show_draw<V: View>(reply: Result<Reply<DrawResult>>, view: &mut V) -> Outcome {
    match reply {
        Ok(Reply::Success(draw)) => {
            info!(draw_no = draw.draw_no, "draw result rendered");
            view.render(Region::DrawResult, render::draw_result(&draw));
            Outcome::Shown
        }
        Ok(Reply::Failure(message)) => {
            warn!(%message, "draw lookup rejected by server");
            view.render(Region::DrawResult, render::error_message(&message));
            Outcome::Rejected
        }
        Err(e) => {
            error!("draw lookup failed: {}", e);
            view.render(Region::DrawResult, render::lookup_failure());
            Outcome::Failed
        }
    }
}

pub struct DrawLookup<A> {
    api: Arc<A>,
    in_flight: InFlight,
}

impl<A: LottoApi> DrawLookup<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            in_flight: InFlight::default(),
        }
    }

    /// Form submission with the raw draw-number text.
    pub async fn submit<V: View>(&self, input: &str, view: &mut V) -> Outcome {
        let Some(_token) = self.in_flight.try_begin() else {
            debug!("draw lookup already in flight");
            return Outcome::Busy;
        };

        let draw_no = match DrawNo::parse(input) {
            Ok(draw_no) => draw_no,
            Err(e) => {
                warn!("rejected draw number input: {}", e);
                view.render(
                    Region::DrawResult,
                    render::error_message(render::INVALID_DRAW_NO),
                );
                return Outcome::Invalid;
            }
        };

        let reply = self.api.draw(draw_no).await;
        show_draw(reply, view)
    }

    pub async fn latest<V: View>(&self, view: &mut V) -> Outcome {
        let Some(_token) = self.in_flight.try_begin() else {
            debug!("draw lookup already in flight");
            return Outcome::Busy;
        };

        let reply = self.api.latest_draw().await;
        show_draw(reply, view)
    }

    /// Compares picked numbers with the latest draw's winning numbers.
    pub async fn check<V: View>(&self, numbers: Vec<u8>, view: &mut V) -> Outcome {
        let picks = match LottoNumbers::new(numbers) {
            Ok(picks) => picks,
            Err(e) => {
                warn!("rejected picked numbers: {}", e);
                view.render(
                    Region::DrawResult,
                    render::error_message(render::NUMBERS_INVALID),
                );
                return Outcome::Invalid;
            }
        };
        let Some(_token) = self.in_flight.try_begin() else {
            debug!("draw lookup already in flight");
            return Outcome::Busy;
        };

        match self.api.latest_draw().await {
            Ok(Reply::Success(draw)) => {
                info!(draw_no = draw.draw_no, "picked numbers checked");
                view.render(
                    Region::DrawResult,
                    render::number_check(&draw, picks.as_slice()),
                );
                Outcome::Shown
            }
            other => show_draw(other, view),
        }
    }

    /// Next draw from the latest known one, or from the calendar when the
    /// server can't say.
    pub async fn upcoming<V: View>(&self, today: NaiveDate, view: &mut V) -> Outcome {
        let Some(_token) = self.in_flight.try_begin() else {
            debug!("draw lookup already in flight");
            return Outcome::Busy;
        };

        let (draw_no, estimated) = match self.api.latest_draw().await {
            Ok(Reply::Success(latest)) => (latest.draw_no.saturating_add(1), false),
            Ok(Reply::Failure(message)) => {
                warn!(%message, "latest draw unavailable, estimating from calendar");
                (estimate_latest_draw_no(today).saturating_add(1), true)
            }
            Err(e) => {
                warn!("latest draw unavailable, estimating from calendar: {}", e);
                (estimate_latest_draw_no(today).saturating_add(1), true)
            }
        };

        match draw_date_of(draw_no) {
            Some(date) => {
                view.render(
                    Region::DrawResult,
                    render::next_draw(draw_no, date, estimated),
                );
                Outcome::Shown
            }
            None => {
                error!(draw_no, "no calendar date for draw");
                view.render(Region::DrawResult, render::lookup_failure());
                Outcome::Failed
            }
        }
    }
}

pub struct CouponDeletion<A> {
    api: Arc<A>,
    in_flight: InFlight,
}

impl<A: LottoApi> CouponDeletion<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            in_flight: InFlight::default(),
        }
    }

    pub async fn run<C, V>(&self, coupon_id: &str, confirm: &mut C, view: &mut V) -> Outcome
    where
        C: Confirm,
        V: View,
    {
        let Some(_token) = self.in_flight.try_begin() else {
            debug!("coupon deletion already in flight");
            return Outcome::Busy;
        };

        let coupon_id = coupon_id.trim();
        if coupon_id.is_empty() {
            view.alert(render::COUPON_ID_REQUIRED);
            return Outcome::Invalid;
        }

        if !confirm.confirm(&render::delete_prompt(coupon_id)) {
            debug!(coupon_id, "coupon deletion declined");
            return Outcome::Declined;
        }

        match self.api.delete_coupon(coupon_id).await {
            Ok(reply) => {
                view.alert(reply.message_or(if reply.success {
                    render::DELETE_DONE
                } else {
                    render::DELETE_REJECTED
                }));
                if reply.success {
                    info!(coupon_id, "coupon deleted");
                    view.reload();
                    Outcome::Shown
                } else {
                    warn!(coupon_id, message = ?reply.message, "coupon deletion rejected");
                    Outcome::Rejected
                }
            }
            Err(e) => {
                error!(coupon_id, "coupon deletion failed: {}", e);
                view.alert(render::DELETE_FAILURE);
                Outcome::Failed
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashtagOutcome {
    pub draws: Outcome,
    /// `None` when no coupon code was supplied.
    pub redemption: Option<Outcome>,
}

impl HashtagOutcome {
    pub fn is_failure(&self) -> bool {
        self.draws.is_failure() || self.redemption.is_some_and(Outcome::is_failure)
    }
}

pub struct HashtagDraws<A> {
    api: Arc<A>,
    in_flight: InFlight,
}

impl<A: LottoApi> HashtagDraws<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            in_flight: InFlight::default(),
        }
    }

    /// Loads the hashtag's draws and, when `coupon_code` is given, redeems
    /// that coupon for the same hashtag. The two requests run side by side.
    pub async fn fetch<V: View>(
        &self,
        input: &str,
        coupon_code: Option<&str>,
        view: &mut V,
    ) -> HashtagOutcome {
        let hashtag = input.trim();
        if hashtag.is_empty() {
            view.alert(render::HASHTAG_REQUIRED);
            return HashtagOutcome {
                draws: Outcome::Invalid,
                redemption: None,
            };
        }
        if !is_path_segment(hashtag) {
            warn!(hashtag, "hashtag cannot be used as a path segment");
            view.alert(render::HASHTAG_INVALID);
            return HashtagOutcome {
                draws: Outcome::Invalid,
                redemption: None,
            };
        }

        let Some(_token) = self.in_flight.try_begin() else {
            debug!("hashtag fetch already in flight");
            return HashtagOutcome {
                draws: Outcome::Busy,
                redemption: None,
            };
        };

        let redemption = match coupon_code.map(|code| CouponRedemption::new(code, hashtag)) {
            Some(Ok(redemption)) => Some(redemption),
            Some(Err(e)) => {
                warn!("redemption skipped: {}", e);
                view.alert(render::COUPON_CODE_REQUIRED);
                None
            }
            None => None,
        };
        let skipped_redemption = coupon_code.is_some() && redemption.is_none();

        let (draws, redeemed) = tokio::join!(self.api.hashtag_draws(hashtag), async {
            match &redemption {
                Some(r) => Some(self.api.redeem_coupon(r).await),
                None => None,
            }
        });

        let draws = match draws {
            Ok(Reply::Success(entries)) => {
                info!(hashtag, count = entries.len(), "hashtag draws rendered");
                view.render(Region::DrawResults, render::draw_list(&entries));
                Outcome::Shown
            }
            Ok(Reply::Failure(message)) => {
                warn!(hashtag, %message, "hashtag draws rejected by server");
                view.render(Region::DrawResults, Block::message(message));
                Outcome::Rejected
            }
            Err(e) => {
                error!(hashtag, "Error fetching draws: {}", e);
                view.alert(render::DRAWS_FAILURE);
                Outcome::Failed
            }
        };

        let redemption = match redeemed {
            Some(Ok(reply)) => {
                view.alert(reply.message_or(if reply.success {
                    render::REDEMPTION_DONE
                } else {
                    render::REDEMPTION_REJECTED
                }));
                if reply.success {
                    info!(hashtag, "coupon redeemed");
                    Some(Outcome::Shown)
                } else {
                    warn!(hashtag, message = ?reply.message, "coupon redemption rejected");
                    Some(Outcome::Rejected)
                }
            }
            Some(Err(e)) => {
                error!(hashtag, "coupon redemption failed: {}", e);
                view.alert(render::REDEMPTION_FAILURE);
                Some(Outcome::Failed)
            }
            None if skipped_redemption => Some(Outcome::Invalid),
            None => None,
        };

        HashtagOutcome { draws, redemption }
    }
}

/// Coupon pages: listing, issuing, usage lookup and submission.
pub struct Coupons<A> {
    api: Arc<A>,
    in_flight: InFlight,
}

impl<A: LottoApi> Coupons<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            in_flight: InFlight::default(),
        }
    }

    pub async fn list<V: View>(&self, view: &mut V) -> Outcome {
        let Some(_token) = self.in_flight.try_begin() else {
            return Outcome::Busy;
        };

        match self.api.list_coupons().await {
            Ok(Reply::Success(coupons)) => {
                view.render(Region::Coupons, render::coupon_list(&coupons));
                Outcome::Shown
            }
            Ok(Reply::Failure(message)) => {
                warn!(%message, "coupon list rejected by server");
                view.render(Region::Coupons, render::error_message(&message));
                Outcome::Rejected
            }
            Err(e) => {
                error!("coupon list failed: {}", e);
                view.render(Region::Coupons, render::error_message(render::COUPONS_FAILURE));
                Outcome::Failed
            }
        }
    }

    pub async fn create<V: View>(&self, view: &mut V) -> Outcome {
        let Some(_token) = self.in_flight.try_begin() else {
            return Outcome::Busy;
        };

        match self.api.create_coupon().await {
            Ok(Reply::Success(code)) => {
                info!(coupon_code = %code, "coupon created");
                view.alert(&format!("쿠폰이 생성되었습니다: {}", code));
                view.reload();
                Outcome::Shown
            }
            Ok(Reply::Failure(message)) => {
                warn!(%message, "coupon creation rejected by server");
                view.alert(&message);
                Outcome::Rejected
            }
            Err(e) => {
                error!("coupon creation failed: {}", e);
                view.alert(render::COUPON_CREATE_FAILURE);
                Outcome::Failed
            }
        }
    }

    pub async fn uses<V: View>(&self, input: &str, view: &mut V) -> Outcome {
        let hashtag = input.trim();
        if hashtag.is_empty() {
            view.alert(render::HANDLE_REQUIRED);
            return Outcome::Invalid;
        }
        let Some(_token) = self.in_flight.try_begin() else {
            return Outcome::Busy;
        };

        match self.api.coupon_uses(hashtag).await {
            Ok(Reply::Success(uses)) => {
                view.render(Region::CouponUses, render::coupon_uses(hashtag, &uses));
                Outcome::Shown
            }
            Ok(Reply::Failure(message)) => {
                warn!(hashtag, %message, "coupon usage lookup rejected by server");
                view.render(Region::CouponUses, render::error_message(&message));
                Outcome::Rejected
            }
            Err(e) => {
                error!(hashtag, "coupon usage lookup failed: {}", e);
                view.render(Region::CouponUses, render::error_message(render::COUPONS_FAILURE));
                Outcome::Failed
            }
        }
    }

    pub async fn submit<V: View>(
        &self,
        coupon_code: &str,
        hashtag: &str,
        numbers: Vec<u8>,
        view: &mut V,
    ) -> Outcome {
        let submission = match CouponSubmission::new(coupon_code, hashtag, numbers) {
            Ok(submission) => submission,
            Err(e) => {
                warn!("coupon submission refused: {}", e);
                view.alert(&format!("입력값을 확인해주세요: {}", e));
                return Outcome::Invalid;
            }
        };
        let Some(_token) = self.in_flight.try_begin() else {
            return Outcome::Busy;
        };

        match self.api.submit_coupon(&submission).await {
            Ok(reply) => {
                view.alert(reply.message_or(if reply.success {
                    render::SUBMIT_DONE
                } else {
                    render::SUBMIT_REJECTED
                }));
                if reply.success {
                    info!(coupon_code = %submission.coupon_code, "coupon submitted");
                    Outcome::Shown
                } else {
                    warn!(message = ?reply.message, "coupon submission rejected");
                    Outcome::Rejected
                }
            }
            Err(e) => {
                error!("coupon submission failed: {}", e);
                view.alert(render::SUBMIT_FAILURE);
                Outcome::Failed
            }
        }
    }
}
