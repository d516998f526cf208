//! Intent routing for chat messages.
//!
//! A message is checked against an ordered table of calculator intents; the
//! first whose predicate matches handles it. Anything left over goes to the
//! BM25 [`Ranker`]. Numeric inputs are read from `key=value` pairs in the
//! message, falling back to [`DesignDefaults`].

use crate::calc::{self, DesignDefaults};
use crate::error::{KbError, Result};
use crate::ranker::{Ranker, ScoredDocument};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, LazyLock};

static PF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpf\b|\bpowder\s*factor\b").expect("valid regex literal"));
static SD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bsd\b|scaled\s*distance|vibration").expect("valid regex literal")
});
static LK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blk\b|kihl|langefors").expect("valid regex literal"));
static NOBEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnobel\b|cartridge").expect("valid regex literal"));
static BURDEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)burden|spacing").expect("valid regex literal"));
static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rule|start|estimate").expect("valid regex literal"));
static KV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z_]+)\s*=\s*([-+]?[0-9]*\.?[0-9]+)").expect("valid regex literal")
});
static DISTANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*(m|meters?|metres?|ft|feet)\b")
        .expect("valid regex literal")
});
static CHARGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*(kg|lbs?)\b").expect("valid regex literal")
});

/// Phrases that suggest the user wanted a calculation but reached the knowledge base.
const CALC_HINT_TRIGGERS: &[&str] = &["calculate", "how much", "compute", "powder factor", " pf", "pf "];
const CALC_HINT: &str = "Try: 'PF h=10 b=3 s=3 j=0.5 t=2 d=165 rho=1000'";

/// What a message was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PowderFactor,
    ScaledDistance,
    LangeforsKihlstrom,
    NobelCartridge,
    StarterRules,
    Knowledge,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::PowderFactor => "powder_factor",
            Intent::ScaledDistance => "scaled_distance",
            Intent::LangeforsKihlstrom => "langefors_kihlstrom",
            Intent::NobelCartridge => "nobel_cartridge",
            Intent::StarterRules => "starter_rules",
            Intent::Knowledge => "knowledge",
        }
    }
}

/// A routed answer, rendered as markdown in `text`.
#[derive(Debug, Clone)]
pub struct Reply {
    pub intent: Intent,
    pub text: String,
    /// Set for knowledge-base answers.
    pub hit: Option<ScoredDocument>,
}

/// One calculator entry in the routing table.
struct Route {
    intent: Intent,
    matches: fn(&str) -> bool,
    handle: fn(&str, &DesignDefaults) -> String,
}

fn is_powder_factor(m: &str) -> bool {
    PF_RE.is_match(m)
}

fn is_scaled_distance(m: &str) -> bool {
    SD_RE.is_match(m)
}

fn is_langefors(m: &str) -> bool {
    LK_RE.is_match(m)
}

fn is_cartridge(m: &str) -> bool {
    NOBEL_RE.is_match(m)
}

fn is_starter_rules(m: &str) -> bool {
    BURDEN_RE.is_match(m) && RULE_RE.is_match(m)
}

/// Evaluated top to bottom; first match wins.
const ROUTES: &[Route] = &[
    Route {
        intent: Intent::PowderFactor,
        matches: is_powder_factor,
        handle: powder_factor_reply,
    },
    Route {
        intent: Intent::ScaledDistance,
        matches: is_scaled_distance,
        handle: scaled_distance_reply,
    },
    Route {
        intent: Intent::LangeforsKihlstrom,
        matches: is_langefors,
        handle: lk_reply,
    },
    Route {
        intent: Intent::NobelCartridge,
        matches: is_cartridge,
        handle: nobel_reply,
    },
    Route {
        intent: Intent::StarterRules,
        matches: is_starter_rules,
        handle: starter_rules_reply,
    },
];

/// Numbers given as `key=value`, keyed by lowercased name. The first occurrence wins.
pub fn parse_kv_numbers(text: &str) -> HashMap<String, f64> {
    let mut out = HashMap::new();
    for caps in KV_RE.captures_iter(text) {
        let key = caps[1].to_lowercase();
        if let Ok(value) = caps[2].parse::<f64>() {
            out.entry(key).or_insert(value);
        }
    }
    out
}

fn value(vals: &HashMap<String, f64>, key: &str, default: f64) -> f64 {
    vals.get(key).copied().unwrap_or(default)
}

fn powder_factor_reply(text: &str, d: &DesignDefaults) -> String {
    let vals = parse_kv_numbers(text);
    let h = value(&vals, "h", d.bench_height);
    let b = value(&vals, "b", d.burden);
    let s = value(&vals, "s", d.spacing);
    let j = value(&vals, "j", d.subdrill);
    let t = value(&vals, "t", d.stemming);
    let dmm = value(&vals, "d", d.hole_diameter_mm);
    let rho = value(&vals, "rho", d.explosive_density);
    let pf = calc::powder_factor(h, b, s, j, t, dmm, rho);
    format!(
        "**Powder Factor**\n\
         - Inputs: H={h:.2} m, B={b:.2} m, S={s:.2} m, J={j:.2} m, T={t:.2} m, D={dmm:.0} mm, ρ={rho:.0} kg/m³\n\
         - Charged length Lc = H+J−T = **{:.2} m**\n\
         - Charge per hole = **{:.1} kg**\n\
         - Rock volume per hole = **{:.2} m³**\n\
         - **PF = {:.3} kg/m³**",
        pf.charged_length, pf.charge_per_hole, pf.rock_volume, pf.powder_factor
    )
}

fn scaled_distance_reply(text: &str, _: &DesignDefaults) -> String {
    let (Some(dist), Some(charge)) = (DISTANCE_RE.captures(text), CHARGE_RE.captures(text)) else {
        return "To compute Scaled Distance, include a distance (m or ft) and a charge per delay \
                (kg or lb). Example: `sd 300 m, 35 kg`."
            .to_string();
    };
    let (Ok(distance), Ok(mut charge_kg)) = (dist[1].parse::<f64>(), charge[1].parse::<f64>())
    else {
        return "Could not read the distance or charge value.".to_string();
    };
    let distance_unit = dist[2].to_lowercase();
    let distance_m = if distance_unit == "ft" || distance_unit == "feet" {
        calc::ft_to_m(distance)
    } else {
        distance
    };
    if charge[2].to_lowercase().starts_with("lb") {
        charge_kg = calc::lb_to_kg(charge_kg);
    }
    match calc::scaled_distance(distance_m, charge_kg) {
        Some(sd) => format!(
            "**Scaled Distance** = distance/√charge = **{sd:.2} m/√kg** \
             (distance={distance} {distance_unit}, charge={charge_kg:.2} kg)"
        ),
        None => "Please provide a positive charge mass per delay.".to_string(),
    }
}

fn lk_reply(text: &str, d: &DesignDefaults) -> String {
    let vals = parse_kv_numbers(text);
    let dmm = value(&vals, "d", d.hole_diameter_mm);
    let k = value(&vals, "k", d.lk_k);
    let alpha = value(&vals, "alpha", d.lk_alpha);
    let f = value(&vals, "f", d.lk_f);
    let bs = calc::lk_burden_spacing(dmm, k, alpha, f);
    format!(
        "**Langefors–Kihlström (parametric)**\n\
         - D={dmm:.0} mm, k={k:.2}, α={alpha:.2}, F={f:.2}\n\
         - **Burden B ≈ {:.2} m**, **Spacing S ≈ {:.2} m**\n\
         _Tune k/α/F to your site calibration._",
        bs.burden, bs.spacing
    )
}

fn nobel_reply(text: &str, d: &DesignDefaults) -> String {
    let vals = parse_kv_numbers(text);
    let h = value(&vals, "h", d.bench_height);
    let j = value(&vals, "j", d.subdrill);
    let t = value(&vals, "t", d.stemming);
    let len = value(&vals, "l", d.cartridge_length);
    let diam = value(&vals, "cart_d", d.cartridge_diameter_mm);
    let rho = value(&vals, "rho", d.cartridge_density);
    let charged = calc::charged_length(h, j, t);
    let est = calc::cartridge_estimate(charged, len, diam, rho);
    format!(
        "**Nobel / cartridge-based estimate**\n\
         - Charged length Lc ≈ **{charged:.2} m**; cartridge L={len:.2} m, Ø={diam:.0} mm, ρ={rho:.0} kg/m³\n\
         - Mass per cartridge ≈ **{:.2} kg**\n\
         - Estimated number of cartridges ≈ **{}**\n\
         - **Total charge ≈ {:.1} kg**",
        est.mass_per_cartridge, est.count, est.total_mass
    )
}

fn starter_rules_reply(text: &str, d: &DesignDefaults) -> String {
    let vals = parse_kv_numbers(text);
    let dmm = value(&vals, "d", d.hole_diameter_mm);
    let r = calc::starter_rules(dmm);
    format!(
        "**Starter rules (bench blasting)**\n\
         - Burden B ≈ **{:.2} m**\n\
         - Spacing S ≈ **{:.2} m**\n\
         - Stemming T ≈ **{:.2} m**\n\
         (Assumed D={dmm:.0} mm; tune for rock/energy/SOP.)",
        r.burden, r.spacing, r.stemming
    )
}

/// Routes chat messages to calculators or the knowledge base.
#[derive(Debug, Clone)]
pub struct Router {
    ranker: Option<Arc<Ranker>>,
    defaults: DesignDefaults,
}

impl Router {
    /// `ranker` is `None` when no knowledge base is loaded; calculators still work.
    pub fn new(ranker: Option<Arc<Ranker>>, defaults: DesignDefaults) -> Self {
        Self { ranker, defaults }
    }

    pub fn ranker(&self) -> Option<&Arc<Ranker>> {
        self.ranker.as_ref()
    }

    pub fn defaults(&self) -> &DesignDefaults {
        &self.defaults
    }

    /// The calculator intent `message` would be routed to, if any.
    pub fn classify(message: &str) -> Option<Intent> {
        ROUTES
            .iter()
            .find(|route| (route.matches)(message))
            .map(|route| route.intent)
    }

    /// Answers a message.
    ///
    /// Fails with [`KbError::EmptyCorpus`] only when the message falls through
    /// to the knowledge base and none is loaded.
    pub fn respond(&self, raw: &str) -> Result<Reply> {
        let message = raw.trim();
        if let Some(route) = ROUTES.iter().find(|route| (route.matches)(message)) {
            tracing::debug!(intent = route.intent.as_str(), "Calculator intent matched");
            return Ok(Reply {
                intent: route.intent,
                text: (route.handle)(message, &self.defaults),
                hit: None,
            });
        }

        let ranker = self.ranker.as_ref().ok_or(KbError::EmptyCorpus)?;
        let hit = ranker.best_match(message);
        let mut text = format!("**{}**\n{}", hit.document.question, hit.document.answer);
        // Edge spaces count: " pf" and "pf " are triggers.
        let lowered = raw.to_lowercase();
        if CALC_HINT_TRIGGERS.iter().any(|t| lowered.contains(t)) {
            let _ = write!(text, "\n\n{CALC_HINT}");
        }
        Ok(Reply {
            intent: Intent::Knowledge,
            text,
            hit: Some(hit),
        })
    }
}
