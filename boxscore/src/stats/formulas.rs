// Rate statistics derived from raw counters, plus their display formatting.
//
// Every function here is pure. Ratios whose denominator is zero evaluate to
// 0.0 instead of dividing by zero. Counters are combined as u64 so sums of
// large u32 counters cannot overflow.

/// Hits are singles + doubles + triples + home runs.
pub fn hits(singles: u32, doubles: u32, triples: u32, home_runs: u32) -> u64 {
    u64::from(singles) + u64::from(doubles) + u64::from(triples) + u64::from(home_runs)
}

/// Total bases: 1B + 2x2B + 3x3B + 4xHR.
pub fn total_bases(singles: u32, doubles: u32, triples: u32, home_runs: u32) -> u64 {
    u64::from(singles) + 2 * u64::from(doubles) + 3 * u64::from(triples) + 4 * u64::from(home_runs)
}

/// AVG = hits / AB.
pub fn batting_average(singles: u32, doubles: u32, triples: u32, home_runs: u32, at_bats: u32) -> f64 {
    if at_bats == 0 {
        return 0.0;
    }
    hits(singles, doubles, triples, home_runs) as f64 / f64::from(at_bats)
}

/// OBP = hits / (AB + BB).
///
/// Walks only widen the denominator; the numerator is hits alone.
pub fn on_base_percentage(
    singles: u32,
    doubles: u32,
    triples: u32,
    home_runs: u32,
    walks: u32,
    at_bats: u32,
) -> f64 {
    let denom = u64::from(at_bats) + u64::from(walks);
    if denom == 0 {
        return 0.0;
    }
    hits(singles, doubles, triples, home_runs) as f64 / denom as f64
}

/// SLG = total bases / AB.
pub fn slugging_percentage(singles: u32, doubles: u32, triples: u32, home_runs: u32, at_bats: u32) -> f64 {
    if at_bats == 0 {
        return 0.0;
    }
    total_bases(singles, doubles, triples, home_runs) as f64 / f64::from(at_bats)
}

/// OPS = OBP + SLG.
pub fn on_base_plus_slugging(obp: f64, slg: f64) -> f64 {
    obp + slg
}

/// IP = outs / 3, as a plain decimal (4 outs is 1.333.., not "1.1").
pub fn innings_pitched(outs: u32) -> f64 {
    f64::from(outs) / 3.0
}

/// ERA = 9 x ER / IP.
pub fn earned_run_average(earned_runs: u32, outs: u32) -> f64 {
    let ip = innings_pitched(outs);
    if ip > 0.0 {
        9.0 * f64::from(earned_runs) / ip
    } else {
        0.0
    }
}

/// WHIP = (BB + H) / IP.
pub fn walks_plus_hits_per_inning(walks: u32, hits_allowed: u32, outs: u32) -> f64 {
    let ip = innings_pitched(outs);
    if ip > 0.0 {
        (f64::from(walks) + f64::from(hits_allowed)) / ip
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Display formatting
// ---------------------------------------------------------------------------

/// Format a rate like AVG/OBP/SLG/OPS as `.XXX`.
///
/// The value is scaled by 1000 and rounded half-up, then zero-padded to
/// three digits with no leading zero. Values of 1.0 or more keep all
/// their digits (an OPS of 1.25 renders as `.1250`).
pub fn format_three_decimal_rate(value: f64) -> String {
    let scaled = (value * 1000.0 + 0.5).floor().max(0.0) as u64;
    format!(".{scaled:03}")
}

/// Fixed two decimals, used for ERA and WHIP.
pub fn format_rate(value: f64) -> String {
    format!("{value:.2}")
}

/// Fixed one decimal, used for IP.
pub fn format_innings(ip: f64) -> String {
    format!("{ip:.1}")
}
