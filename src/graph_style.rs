//! Styling callbacks for the force-directed transaction graph.
//!
//! The graph widget and its layout live outside this crate. It asks for
//! node and link colors, labels, stroke widths and directional particle
//! counts through per-item callbacks, and paints a pulsing glow behind
//! suspicious nodes. [`GraphStyle`] answers all of those from the shared
//! palette and [`GraphOptions`] thresholds.
//!
//! The record types mirror the analysis service payload
//! (`{graph: {nodes, links}, fraud_rings}`) so hosts can deserialize it
//! straight into them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::options::{GraphOptions, Options, PaletteOptions};
use crate::surface::{Paint, RadialGradient, Rgba, Surface};

/// An account in the transaction graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphNode {
    /// Account identifier.
    pub id: String,
    /// Flagged by the analysis service.
    pub is_suspicious: bool,
    /// Suspicion score assigned by the analysis service.
    pub suspicion_score: f64,
    /// Names of the fraud patterns the account matched.
    pub patterns: Vec<String>,
    /// Fraud ring the account belongs to, if any.
    pub ring_id: Option<String>,
    /// Community index from the service's clustering.
    pub community: i64,
    /// Layout x position, once the widget has placed the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Layout y position, once the widget has placed the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// A transfer between two accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphLink {
    /// Sending account id.
    pub source: String,
    /// Receiving account id.
    pub target: String,
    /// Transferred amount.
    pub amount: f64,
    /// Age of the transfer in days.
    pub age_days: f64,
}

/// A detected fraud ring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FraudRing {
    /// Ring identifier, referenced by [`GraphNode::ring_id`].
    pub ring_id: String,
    /// Pattern that defines the ring (cycle, smurfing, ...).
    pub pattern_type: String,
    /// Aggregate risk score.
    pub risk_score: f64,
    /// Ids of the accounts in the ring.
    pub member_accounts: Vec<String>,
}

/// Nodes and links of the transaction graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphData {
    /// Accounts.
    pub nodes: Vec<GraphNode>,
    /// Transfers.
    pub links: Vec<GraphLink>,
}

/// Payload returned by the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResponse {
    /// The graph to lay out.
    pub graph: GraphData,
    /// Rings found in it.
    pub fraud_rings: Vec<FraudRing>,
}

/// Recency tier of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAge {
    /// Within the fresh window; animated with directional particles.
    Fresh,
    /// Older than fresh but within the recent window.
    Recent,
    /// Everything older (or of unknown age).
    Stale,
}

/// Colors and thresholds for the transaction graph widget.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStyle {
    options: GraphOptions,
    suspicious: Rgba,
    normal: Rgba,
    fresh: Rgba,
}

impl GraphStyle {
    /// Style from explicit graph options and palette.
    #[must_use]
    pub fn new(options: &GraphOptions, palette: &PaletteOptions) -> Self {
        Self {
            options: options.clone(),
            suspicious: Rgba::from_rgb(palette.alarm, 1.0),
            normal: Rgba::from_rgb(palette.secondary, 1.0),
            fresh: Rgba::from_rgb(palette.primary, 1.0),
        }
    }

    /// Style from the `graph` and `palette` sections of `options`.
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self::new(&options.graph, &options.palette)
    }

    /// Recency tier of `link`. Both bounds are inclusive.
    #[must_use]
    pub fn link_age(&self, link: &GraphLink) -> LinkAge {
        if link.age_days <= self.options.fresh_days {
            LinkAge::Fresh
        } else if link.age_days <= self.options.recent_days {
            LinkAge::Recent
        } else {
            LinkAge::Stale
        }
    }

    /// Alarm red for suspicious accounts, signal blue otherwise.
    #[must_use]
    pub fn node_color(&self, node: &GraphNode) -> Rgba {
        if node.is_suspicious {
            self.suspicious
        } else {
            self.normal
        }
    }

    /// Hover text: the id alone for clean accounts, the full finding for
    /// suspicious ones.
    #[must_use]
    pub fn node_label(&self, node: &GraphNode) -> String {
        if !node.is_suspicious {
            return format!("Account: {}", node.id);
        }
        format!(
            "Account: {}\nSuspicion Score: {}\nPatterns: {}\nRing: {}",
            node.id,
            node.suspicion_score,
            node.patterns.join(", "),
            node.ring_id.as_deref().unwrap_or("N/A"),
        )
    }

    /// Stroke width growing with the order of magnitude of the amount,
    /// never below [`GraphOptions::min_link_width`].
    #[must_use]
    pub fn link_width(&self, link: &GraphLink) -> f64 {
        (link.amount + 1.0).log10().max(self.options.min_link_width)
    }

    /// Hover text for a link.
    #[must_use]
    pub fn link_label(&self, link: &GraphLink) -> String {
        format!("Amount: {}", link.amount)
    }

    /// Mint for fresh links, blue for recent ones, faded blue for the rest.
    #[must_use]
    pub fn link_color(&self, link: &GraphLink) -> Rgba {
        match self.link_age(link) {
            LinkAge::Fresh => self.fresh,
            LinkAge::Recent => self.normal,
            LinkAge::Stale => self.normal.with_alpha(self.options.stale_link_alpha),
        }
    }

    /// Directional particles animated along `link`: only fresh links move.
    #[must_use]
    pub fn link_particles(&self, link: &GraphLink) -> u32 {
        match self.link_age(link) {
            LinkAge::Fresh => self.options.fresh_link_particles,
            LinkAge::Recent | LinkAge::Stale => 0,
        }
    }

    /// Color of the directional particles.
    #[must_use]
    pub fn particle_color(&self) -> Rgba {
        self.fresh
    }

    /// Glow radius at `timestamp_ms`: breathes around
    /// [`GraphOptions::glow_radius`] by [`GraphOptions::glow_amplitude`].
    #[must_use]
    pub fn glow_radius(&self, timestamp_ms: f64) -> f32 {
        let swing = (timestamp_ms / self.options.glow_period_ms).sin() as f32;
        self.options
            .glow_amplitude
            .mul_add(swing, self.options.glow_radius)
            .max(0.0)
    }

    /// Paint the pulsing glow behind a suspicious node. Clean nodes get
    /// nothing; an unplaced node glows at the origin.
    pub fn paint_glow(&self, node: &GraphNode, timestamp_ms: f64, surface: &mut dyn Surface) {
        if !node.is_suspicious {
            return;
        }
        let center = Vec2::new(
            node.x.unwrap_or_default() as f32,
            node.y.unwrap_or_default() as f32,
        );
        let radius = self.glow_radius(timestamp_ms);
        let inner = self.suspicious.with_alpha(self.options.glow_alpha);
        let gradient = RadialGradient::new(center, radius, inner, inner.faded());
        surface.fill_circle(center, radius, &Paint::Radial(gradient));
    }
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self::new(&GraphOptions::default(), &PaletteOptions::default())
    }
}
