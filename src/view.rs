use crate::render::Block;

/// Page areas a handler can replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    DrawResult,
    DrawResults,
    Coupons,
    CouponUses,
}

pub trait View {
    /// Replaces the region's content wholesale.
    fn render(&mut self, region: Region, block: Block);
    fn alert(&mut self, message: &str);
    fn reload(&mut self);
}

pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}
