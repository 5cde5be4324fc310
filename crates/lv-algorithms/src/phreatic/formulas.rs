//! Level formulas per material layout

use lv_core::geometry::interpolate_z;
use lv_core::{MaterialLayoutRegime, Point};

use crate::config::PhreaticLineConfig;

/// Water levels and offsets the formulas work with
#[derive(Debug, Clone, Copy)]
pub(crate) struct Levels<'a> {
    pub river: f64,
    /// Surface level at the embankment toe land side
    pub surface_at_toe: f64,
    pub config: &'a PhreaticLineConfig,
}

/// Unclamped level of point E
type ELevel = fn(&Levels) -> f64;
/// Level of point B at x, given A and E
type BLevel = fn(&Levels, Point, Point, f64) -> f64;
/// Level of point C at x, given A, B and E
type CLevel = fn(&Levels, Point, Point, Point, f64) -> f64;

/// The level formulas of one material layout
#[derive(Clone, Copy)]
pub(crate) struct FormulaSet {
    pub e_level: ELevel,
    pub b_level: BLevel,
    pub c_level: CLevel,
}

impl FormulaSet {
    pub fn for_regime(regime: MaterialLayoutRegime) -> Self {
        match regime {
            MaterialLayoutRegime::ClayEmbankmentOnClay
            | MaterialLayoutRegime::ClayEmbankmentOnSand => CLAY_EMBANKMENT,
            MaterialLayoutRegime::SandEmbankmentOnClay => SAND_EMBANKMENT_ON_CLAY,
            MaterialLayoutRegime::SandEmbankmentOnSand => SAND_EMBANKMENT_ON_SAND,
        }
    }
}

const CLAY_EMBANKMENT: FormulaSet = FormulaSet {
    e_level: surface_minus_offset,
    b_level: river_minus_b_offset,
    c_level: river_minus_c_offset,
};

const SAND_EMBANKMENT_ON_CLAY: FormulaSet = FormulaSet {
    e_level: surface_minus_head_fraction,
    b_level: river_minus_sand_b_offset,
    c_level: between_b_and_e,
};

const SAND_EMBANKMENT_ON_SAND: FormulaSet = FormulaSet {
    e_level: surface_minus_head_fraction,
    b_level: between_a_and_e,
    c_level: between_a_and_e_for_c,
};

fn surface_minus_offset(levels: &Levels) -> f64 {
    levels.surface_at_toe - levels.config.e_offset
}

fn surface_minus_head_fraction(levels: &Levels) -> f64 {
    let head = (levels.river - levels.surface_at_toe).max(0.0);
    levels.surface_at_toe - levels.config.sand_e_fraction * head
}

fn river_minus_b_offset(levels: &Levels, _a: Point, _e: Point, _x: f64) -> f64 {
    levels.river - levels.config.b_offset
}

fn river_minus_sand_b_offset(levels: &Levels, _a: Point, _e: Point, _x: f64) -> f64 {
    levels.river - levels.config.sand_b_offset
}

fn between_a_and_e(_levels: &Levels, a: Point, e: Point, x: f64) -> f64 {
    interpolate_z(a, e, x)
}

fn river_minus_c_offset(levels: &Levels, _a: Point, _b: Point, _e: Point, _x: f64) -> f64 {
    levels.river - levels.config.c_offset
}

fn between_b_and_e(_levels: &Levels, _a: Point, b: Point, e: Point, x: f64) -> f64 {
    interpolate_z(b, e, x)
}

fn between_a_and_e_for_c(_levels: &Levels, a: Point, _b: Point, e: Point, x: f64) -> f64 {
    interpolate_z(a, e, x)
}
