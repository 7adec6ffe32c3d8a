//! Attribute cost tables.
//!
//! Ratings run 5..=20. Each table row is the incremental cost of
//! reaching that rating from the one below, plus the running total
//! from the floor. The tables are ordered arrays indexed by
//! `rating - MIN_RATING`; shape is checked once at first access.

use crate::attributes::PositionClass;
use crate::types::Tpe;
use std::sync::OnceLock;

pub const MIN_RATING: u8 = 5;
pub const MAX_RATING: u8 = 20;

/// Returned by `next_increment_cost` for ratings above the table
/// domain, where no further increment exists.
pub const UNREACHABLE_COST: Tpe = Tpe::MAX;

/// Display-only discount applied to skater stamina totals. Never
/// affects the amount actually deducted from any balance.
pub const STAMINA_DISPLAY_SUBSIDY: Tpe = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeCostEntry {
    pub rating: u8,
    pub point_cost: Tpe,
    pub total_cost: Tpe,
}

const fn entry(rating: u8, point_cost: Tpe, total_cost: Tpe) -> AttributeCostEntry {
    AttributeCostEntry {
        rating,
        point_cost,
        total_cost,
    }
}

const TABLE_LEN: usize = (MAX_RATING - MIN_RATING + 1) as usize;

static SKATER_COSTS: [AttributeCostEntry; TABLE_LEN] = [
    entry(5, 0, 0),
    entry(6, 2, 2),
    entry(7, 2, 4),
    entry(8, 4, 8),
    entry(9, 4, 12),
    entry(10, 4, 16),
    entry(11, 6, 22),
    entry(12, 8, 30),
    entry(13, 8, 38),
    entry(14, 8, 46),
    entry(15, 12, 58),
    entry(16, 12, 70),
    entry(17, 18, 88),
    entry(18, 18, 106),
    entry(19, 25, 131),
    entry(20, 25, 156),
];

static GOALIE_COSTS: [AttributeCostEntry; TABLE_LEN] = [
    entry(5, 0, 0),
    entry(6, 2, 2),
    entry(7, 2, 4),
    entry(8, 3, 7),
    entry(9, 3, 10),
    entry(10, 4, 14),
    entry(11, 5, 19),
    entry(12, 6, 25),
    entry(13, 8, 33),
    entry(14, 10, 43),
    entry(15, 12, 55),
    entry(16, 15, 70),
    entry(17, 18, 88),
    entry(18, 22, 110),
    entry(19, 26, 136),
    entry(20, 30, 166),
];

static TABLES_CHECKED: OnceLock<()> = OnceLock::new();

fn table(class: PositionClass) -> &'static [AttributeCostEntry; TABLE_LEN] {
    TABLES_CHECKED.get_or_init(|| {
        for t in [&SKATER_COSTS, &GOALIE_COSTS] {
            assert_eq!(t[0].rating, MIN_RATING);
            assert_eq!(t[0].total_cost, 0);
            for w in t.windows(2) {
                assert_eq!(w[1].rating, w[0].rating + 1);
                assert_eq!(w[1].total_cost, w[0].total_cost + w[1].point_cost);
                assert!(w[1].total_cost >= w[0].total_cost);
            }
        }
    });
    match class {
        PositionClass::Skater => &SKATER_COSTS,
        PositionClass::Goalkeeper => &GOALIE_COSTS,
    }
}

/// Cost entry for a rating. Ratings below the table floor are an
/// input-contract violation, not a recoverable case.
pub fn cost(class: PositionClass, rating: u8) -> AttributeCostEntry {
    assert!(
        (MIN_RATING..=MAX_RATING).contains(&rating),
        "rating {rating} outside cost table domain [{MIN_RATING}, {MAX_RATING}]"
    );
    table(class)[(rating - MIN_RATING) as usize]
}

/// Cumulative cost of holding `rating`.
pub fn total_cost(class: PositionClass, rating: u8) -> Tpe {
    cost(class, rating).total_cost
}

/// Cost of the next single-point increment from `rating`. Zero at the
/// table maximum; an unreachable sentinel above the domain.
pub fn next_increment_cost(class: PositionClass, rating: u8) -> Tpe {
    assert!(
        rating >= MIN_RATING,
        "rating {rating} below cost table domain"
    );
    if rating == MAX_RATING {
        0
    } else if rating > MAX_RATING {
        UNREACHABLE_COST
    } else {
        total_cost(class, rating + 1) - total_cost(class, rating)
    }
}

/// Cost of moving between two ratings in either direction. Positive
/// when raising, negative (a refund) when lowering.
pub fn transition_cost(class: PositionClass, from: u8, to: u8) -> Tpe {
    total_cost(class, to) - total_cost(class, from)
}

/// Cumulative cost as shown on the update page. Skater stamina is
/// displayed with a fixed subsidy; the deducted amount is always the
/// unsubsidised `total_cost`.
pub fn display_total_cost(class: PositionClass, subsidised: bool, rating: u8) -> Tpe {
    let raw = total_cost(class, rating);
    if subsidised && class == PositionClass::Skater {
        (raw - STAMINA_DISPLAY_SUBSIDY).max(0)
    } else {
        raw
    }
}
