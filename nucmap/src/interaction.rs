//! Hover, focus and selection state for one UI session, driven by named events.

use crate::model::{FeatureKind, FeatureRef, GroupRef, LocationGroup, LonLat, Selection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Visual state of one location group's glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerState {
    Collapsed = 0,
    Hovered = 1,
    Spiderified = 2,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountryHover {
    pub name: String,
    pub iso3: String,
    /// Pointer position in client pixels, for the tooltip.
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapEvent {
    GroupPointerEnter { group: GroupRef },
    GroupPointerLeave { group: GroupRef },
    /// Click on a collapsed glyph.
    GroupClick { group: GroupRef },
    /// Click on a singleton's glyph or on one fanned-out member.
    FeatureClick { group: GroupRef, feature: FeatureRef },
    CountryPointerEnter { name: String, iso3: String, x: f64, y: f64 },
    CountryPointerMove { x: f64, y: f64 },
    CountryPointerLeave,
    CountryClick { iso3: String },
    CountryFocus { iso3: String },
    CloseDetail,
    ViewChanged { zoom: f64, center: LonLat },
}

/// What an event did, for the renderer and for logging.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    Ignored,
    GroupHovered { group: GroupRef, state: MarkerState },
    GroupCollapsed { group: GroupRef },
    Selected { selection: Selection },
    SelectionCleared,
    CountryHoverChanged,
    CountryFocused { iso3: String },
    ViewUpdated { zoom: f64 },
}

/// Access to the current groups of both marker layers.
pub trait GroupLookup {
    fn group(&self, r: GroupRef) -> Option<&LocationGroup>;
    fn has_feature(&self, f: FeatureRef) -> bool;
}

impl GroupLookup for HashMap<GroupRef, LocationGroup> {
    fn group(&self, r: GroupRef) -> Option<&LocationGroup> {
        self.get(&r)
    }
    fn has_feature(&self, f: FeatureRef) -> bool {
        self.values().any(|g| g.members.iter().any(|m| m.feature_ref() == f))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InteractionState {
    pub hovered_group: Option<GroupRef>,
    pub selection: Option<Selection>,
    pub country_hover: Option<CountryHover>,
    pub focused_iso3: Option<String>,
    pub zoom: f64,
    pub center: LonLat,
    pub spiderify_zoom_threshold: f64,
}

impl InteractionState {
    pub fn new(zoom: f64, center: LonLat, spiderify_zoom_threshold: f64) -> InteractionState {
        InteractionState {
            hovered_group: None,
            selection: None,
            country_hover: None,
            focused_iso3: None,
            zoom,
            center,
            spiderify_zoom_threshold,
        }
    }

    pub fn is_hovered(&self, r: GroupRef) -> bool {
        self.hovered_group == Some(r)
    }

    /// Derived glyph state; fan-out follows zoom without extra events.
    pub fn marker_state(&self, r: GroupRef, group: &LocationGroup) -> MarkerState {
        if !self.is_hovered(r) {
            MarkerState::Collapsed
        } else if group.is_cluster() && self.zoom >= self.spiderify_zoom_threshold {
            MarkerState::Spiderified
        } else {
            MarkerState::Hovered
        }
    }

    pub fn selected_feature(&self) -> Option<FeatureRef> {
        match &self.selection {
            Some(Selection::Feature { feature }) => Some(*feature),
            _ => None,
        }
    }

    pub fn selected_country(&self) -> Option<&str> {
        match &self.selection {
            Some(Selection::Country { iso3 }) => Some(iso3),
            _ => None,
        }
    }

    pub fn apply<L: GroupLookup + ?Sized>(&mut self, event: &MapEvent, groups: &L) -> Transition {
        match event {
            MapEvent::GroupPointerEnter { group } => match groups.group(*group) {
                Some(g) => {
                    self.hovered_group = Some(*group);
                    Transition::GroupHovered { group: *group, state: self.marker_state(*group, g) }
                }
                None => Transition::Ignored,
            },
            MapEvent::GroupPointerLeave { group } => {
                // A leave for a group that lost hover already is stale.
                if self.is_hovered(*group) {
                    self.hovered_group = None;
                    Transition::GroupCollapsed { group: *group }
                } else {
                    Transition::Ignored
                }
            }
            MapEvent::GroupClick { group } => match groups.group(*group) {
                Some(g) if g.len() == 1 => self.select(Selection::Feature { feature: g.members[0].feature_ref() }),
                _ => Transition::Ignored,
            },
            MapEvent::FeatureClick { group, feature } => {
                let Some(g) = groups.group(*group) else {
                    return Transition::Ignored;
                };
                if !g.members.iter().any(|m| m.feature_ref() == *feature) {
                    return Transition::Ignored;
                }
                let clickable = g.len() == 1 || self.marker_state(*group, g) == MarkerState::Spiderified;
                if clickable {
                    self.select(Selection::Feature { feature: *feature })
                } else {
                    Transition::Ignored
                }
            }
            MapEvent::CountryPointerEnter { name, iso3, x, y } => {
                self.country_hover = Some(CountryHover { name: name.clone(), iso3: iso3.clone(), x: *x, y: *y });
                Transition::CountryHoverChanged
            }
            MapEvent::CountryPointerMove { x, y } => match self.country_hover.as_mut() {
                Some(h) => {
                    h.x = *x;
                    h.y = *y;
                    Transition::CountryHoverChanged
                }
                None => Transition::Ignored,
            },
            MapEvent::CountryPointerLeave => {
                if self.country_hover.take().is_some() {
                    Transition::CountryHoverChanged
                } else {
                    Transition::Ignored
                }
            }
            MapEvent::CountryClick { iso3 } => {
                self.focused_iso3 = Some(iso3.clone());
                self.select(Selection::Country { iso3: iso3.clone() })
            }
            MapEvent::CountryFocus { iso3 } => {
                self.focused_iso3 = Some(iso3.clone());
                Transition::CountryFocused { iso3: iso3.clone() }
            }
            MapEvent::CloseDetail => {
                if self.selection.take().is_some() {
                    Transition::SelectionCleared
                } else {
                    Transition::Ignored
                }
            }
            MapEvent::ViewChanged { zoom, center } => {
                self.zoom = *zoom;
                self.center = *center;
                Transition::ViewUpdated { zoom: *zoom }
            }
        }
    }

    fn select(&mut self, selection: Selection) -> Transition {
        self.selection = Some(selection.clone());
        Transition::Selected { selection }
    }

    /// Drops hover and feature selection that point at groups or features no
    /// longer present after a reload of `layer`.
    pub fn retain_valid<L: GroupLookup + ?Sized>(&mut self, layer: FeatureKind, groups: &L) {
        if let Some(h) = self.hovered_group {
            if h.layer == layer && groups.group(h).is_none() {
                self.hovered_group = None;
            }
        }
        if let Some(f) = self.selected_feature() {
            if f.kind == layer && !groups.has_feature(f) {
                self.selection = None;
            }
        }
    }
}
