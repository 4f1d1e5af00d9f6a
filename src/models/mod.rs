//! # ماژول مدل‌ها (Domain Models)
//!
//! ## تفاوت انواع مدل:
//! - **Entity**: داده‌ای که در دیتابیس ذخیره میشه (`Link`, `ClickEvent`)
//! - **New\***: داده ورودی برای درج (`NewLink`, `NewClickEvent`)
//! - **DTO**: برای ارسال/دریافت از API (همه با کلیدهای camelCase)

mod click;
mod dto;
mod link;
mod stats;

// Re-export همه مدل‌ها
pub use click::*;
pub use dto::*;
pub use link::*;
pub use stats::*;
