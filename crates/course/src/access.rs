//! Chapter access rules.
//!
//! Precedence, first match wins:
//! 1. the user purchased the course
//! 2. the course is free (no price or a price of zero)
//! 3. the chapter is a free preview
//! 4. the chapter's unlock date has passed
//!
//! Anything else is locked.

use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Unlock {
    Purchased,
    FreeCourse,
    FreePreview,
    UnlockDateReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Unlocked(Unlock),
    Locked,
}

impl Access {
    pub fn is_locked(&self) -> bool {
        matches!(self, Access::Locked)
    }

    pub fn unlock(&self) -> Option<Unlock> {
        match self {
            Access::Unlocked(reason) => Some(*reason),
            Access::Locked => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChapterAccess {
    pub has_purchase: bool,
    pub course_price: Option<i64>,
    pub is_free: bool,
    pub unlock_at: Option<OffsetDateTime>,
}

impl ChapterAccess {
    pub fn decide(&self, now: OffsetDateTime) -> Access {
        if self.has_purchase {
            return Access::Unlocked(Unlock::Purchased);
        }

        if is_free_course(self.course_price) {
            return Access::Unlocked(Unlock::FreeCourse);
        }

        if self.is_free {
            return Access::Unlocked(Unlock::FreePreview);
        }

        match self.unlock_at {
            Some(unlock_at) if unlock_at <= now => Access::Unlocked(Unlock::UnlockDateReached),
            _ => Access::Locked,
        }
    }
}

pub fn is_free_course(price: Option<i64>) -> bool {
    matches!(price, None | Some(0))
}

/// Whole-course access, ignoring per-chapter previews and unlock dates.
pub fn has_course_access(has_purchase: bool, price: Option<i64>) -> bool {
    has_purchase || is_free_course(price)
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;

    const PAID: Option<i64> = Some(50_000);

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap()
    }

    #[test]
    fn truth_table() {
        let now = now();
        let prices = [None, Some(0), PAID];
        let unlocks = [
            None,
            Some(now - Duration::days(1)),
            Some(now),
            Some(now + Duration::days(1)),
        ];

        for has_purchase in [false, true] {
            for course_price in prices {
                for is_free in [false, true] {
                    for unlock_at in unlocks {
                        let access = ChapterAccess {
                            has_purchase,
                            course_price,
                            is_free,
                            unlock_at,
                        }
                        .decide(now);

                        let expected = if has_purchase {
                            Access::Unlocked(Unlock::Purchased)
                        } else if course_price.unwrap_or(0) == 0 {
                            Access::Unlocked(Unlock::FreeCourse)
                        } else if is_free {
                            Access::Unlocked(Unlock::FreePreview)
                        } else if unlock_at.is_some_and(|at| at <= now) {
                            Access::Unlocked(Unlock::UnlockDateReached)
                        } else {
                            Access::Locked
                        };

                        assert_eq!(
                            access, expected,
                            "purchase={has_purchase} price={course_price:?} free={is_free} unlock={unlock_at:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn free_course_without_purchase() {
        let access = ChapterAccess {
            has_purchase: false,
            course_price: Some(0),
            is_free: false,
            unlock_at: None,
        };

        assert_eq!(access.decide(now()), Access::Unlocked(Unlock::FreeCourse));
    }

    #[test]
    fn paid_course_with_free_preview() {
        let preview = ChapterAccess {
            has_purchase: false,
            course_price: PAID,
            is_free: true,
            unlock_at: None,
        };
        let regular = ChapterAccess {
            is_free: false,
            ..preview
        };

        assert_eq!(preview.decide(now()), Access::Unlocked(Unlock::FreePreview));
        assert!(regular.decide(now()).is_locked());
    }

    #[test]
    fn future_unlock_date_opens_once_reached() {
        let access = ChapterAccess {
            has_purchase: false,
            course_price: PAID,
            is_free: false,
            unlock_at: Some(now() + Duration::days(7)),
        };

        assert!(access.decide(now()).is_locked());
        assert!(access.decide(now() + Duration::days(6)).is_locked());
        assert_eq!(
            access.decide(now() + Duration::days(7)),
            Access::Unlocked(Unlock::UnlockDateReached)
        );
    }

    #[test]
    fn purchase_wins_over_everything() {
        let access = ChapterAccess {
            has_purchase: true,
            course_price: PAID,
            is_free: true,
            unlock_at: Some(now() - Duration::days(1)),
        };

        assert_eq!(access.decide(now()).unlock(), Some(Unlock::Purchased));
    }

    #[test]
    fn course_access() {
        assert!(has_course_access(false, None));
        assert!(has_course_access(false, Some(0)));
        assert!(has_course_access(true, PAID));
        assert!(!has_course_access(false, PAID));
    }
}
