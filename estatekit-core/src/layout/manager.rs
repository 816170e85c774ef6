//! Layout set manager
//!
//! Reconciles a [`LayoutSet`] with a newly declared layout count and keeps
//! the common fields of attached layouts in step with the reference layout
//! (position 0).
//!
//! Both operations are pure: they take the current set and return the next
//! one, so they can run on every keystroke without side effects.
//!
//! Per non-reference layout the inheritance flag is a two-state machine:
//!
//! ```text
//!   Attached --(manual common edit | toggle off)--> Detached
//!   Detached --(toggle on, re-syncs immediately)--> Attached
//! ```
//!
//! A manual edit of a common field always detaches, even when the same call
//! asks to re-attach.

use super::common::CommonFieldSnapshot;
use super::patch::LayoutPatch;
use super::LayoutSet;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Upper bound on layouts per listing unless a policy says otherwise
pub const DEFAULT_MAX_LAYOUTS: usize = 50;

/// Project-wide layout behaviour owned by the upload form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPolicy {
    /// Copy the reference layout's common fields to attached layouts
    pub enable_sync: bool,
    /// Overlay forced onto every layout (e.g. one category for a bulk project)
    pub project_defaults: LayoutPatch,
    /// Requested counts above this are capped
    pub max_layouts: usize,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            enable_sync: false,
            project_defaults: LayoutPatch::default(),
            max_layouts: DEFAULT_MAX_LAYOUTS,
        }
    }
}

impl LayoutPolicy {
    pub fn synced() -> Self {
        Self { enable_sync: true, ..Default::default() }
    }

    pub fn with_project_defaults(mut self, defaults: LayoutPatch) -> Self {
        self.project_defaults = defaults;
        self
    }

    pub fn with_max_layouts(mut self, max_layouts: usize) -> Self {
        self.max_layouts = max_layouts;
        self
    }
}

/// Intent of a single layout edit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateMeta {
    /// The user edited one of the common fields by hand
    pub common_field_changed: bool,
    /// Explicit follow (`true`) / don't-follow (`false`) choice
    pub inherit_toggle: Option<bool>,
}

impl UpdateMeta {
    pub fn common_edit() -> Self {
        Self { common_field_changed: true, inherit_toggle: None }
    }

    pub fn toggle(follow: bool) -> Self {
        Self { common_field_changed: false, inherit_toggle: Some(follow) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritState {
    Attached,
    Detached,
}

/// Layout count from a raw numeric input; anything but a positive whole
/// number that fits in `usize` is 0
pub fn layout_count_from_f64(value: f64) -> usize {
    // usize::MAX as f64 rounds up to 2^64, so equality is already out of range
    if value.is_finite() && value > 0.0 && value.fract() == 0.0 && value < usize::MAX as f64 {
        value as usize
    } else {
        0
    }
}

/// Layout count from form text; unparsable input is 0
pub fn parse_layout_count(input: &str) -> usize {
    input.trim().parse::<f64>().map_or(0, layout_count_from_f64)
}

/// Resize `current` to exactly `new_count` layouts, capped at the policy's
/// `max_layouts`.
///
/// Layouts at surviving positions keep their values, trailing layouts are
/// dropped, and new positions get default layouts with fresh ids. The
/// policy's project defaults are then overlaid on every layout and, with
/// sync enabled, attached layouts receive the reference layout's common
/// fields.
pub fn set_layout_count(current: &LayoutSet, new_count: usize, policy: &LayoutPolicy) -> LayoutSet {
    let mut next = current.clone();
    let new_count = if new_count > policy.max_layouts {
        log::warn!("Layout count {} capped at {}", new_count, policy.max_layouts);
        policy.max_layouts
    } else {
        new_count
    };
    if new_count == 0 {
        if !next.layouts.is_empty() {
            log::debug!("Clearing {} layouts", next.layouts.len());
        }
        next.layouts.clear();
        return next;
    }

    let previous = next.layouts.len();
    next.layouts.truncate(new_count);
    while next.layouts.len() < new_count {
        next.push_new();
    }

    if !policy.project_defaults.is_empty() {
        let defaults = project_defaults_for(&next, &policy.project_defaults);
        for layout in next.layouts.iter_mut() {
            defaults.apply_to(layout);
        }
    }

    normalize_flags(&mut next);

    if policy.enable_sync && next.layouts.len() > 1 {
        let receivers = broadcast_reference(&mut next);
        log::debug!("Synced common fields to {} of {} layouts", receivers, new_count - 1);
    }

    log::debug!("Layout count {} -> {}", previous, new_count);
    next
}

/// Apply `patch` to the layout at `index` and re-establish the sync rules.
///
/// A common-field edit of the reference layout reaches every attached
/// layout. An out-of-range index leaves the layouts as they were.
pub fn update_layout(
    current: &LayoutSet,
    index: usize,
    patch: &LayoutPatch,
    meta: UpdateMeta,
) -> LayoutSet {
    let mut next = current.clone();
    apply_update(&mut next, index, patch, meta, true);
    pin_reference(&mut next);
    next
}

/// [`update_layout`] under `policy`: reference edits are only broadcast
/// when sync is enabled
pub fn update_layout_with_policy(
    current: &LayoutSet,
    index: usize,
    patch: &LayoutPatch,
    meta: UpdateMeta,
    policy: &LayoutPolicy,
) -> LayoutSet {
    let mut next = current.clone();
    apply_update(&mut next, index, patch, meta, policy.enable_sync);
    pin_reference(&mut next);
    next
}

fn apply_update(next: &mut LayoutSet, index: usize, patch: &LayoutPatch, meta: UpdateMeta, broadcast: bool) {
    let len = next.layouts.len();
    let Some(target) = next.layouts.get_mut(index) else {
        log::debug!("Ignoring update for layout index {} (len {})", index, len);
        return;
    };

    let common_before = CommonFieldSnapshot::of(&target.common);
    patch.apply_to(target);
    let changed_fields = common_before.fields().diff(&target.common);
    let common_changed = !changed_fields.is_empty();

    if index == 0 {
        if common_changed && broadcast {
            let receivers = broadcast_reference(next);
            log::debug!("Reference layout changed, broadcast to {} layouts", receivers);
        }
        return;
    }

    if target.inherit_common.is_none() {
        target.inherit_common = Some(true);
    }

    let manual_edit = meta.common_field_changed || common_changed;
    if manual_edit {
        if target.inherit_common != Some(false) {
            let fields = if common_changed { changed_fields } else { patch.common_fields_touched() };
            log::debug!("Detaching {} after manual edit of {:?}", target.id, fields);
        }
        target.inherit_common = Some(false);
    } else if let Some(follow) = meta.inherit_toggle {
        target.inherit_common = Some(follow);
        if follow {
            let snapshot = CommonFieldSnapshot::of(&next.layouts[0].common);
            snapshot.apply_to(&mut next.layouts[index].common);
            log::debug!("Re-attached {} and caught up with reference", next.layouts[index].id);
        }
    }
}

/// Project defaults minus mode details that belong to another listing mode
fn project_defaults_for<'a>(set: &LayoutSet, defaults: &'a LayoutPatch) -> Cow<'a, LayoutPatch> {
    match &defaults.details {
        Some(details) if details.mode() != set.mode() => {
            log::warn!("Ignoring {} details in project defaults for a {} listing", details.mode(), set.mode());
            Cow::Owned(LayoutPatch { details: None, ..defaults.clone() })
        }
        _ => Cow::Borrowed(defaults),
    }
}

/// The reference layout never inherits
fn pin_reference(set: &mut LayoutSet) {
    if let Some(reference) = set.layouts.first_mut() {
        reference.inherit_common = Some(false);
    }
}

/// Reference layout is never a receiver; undecided layouts default to attached
fn normalize_flags(set: &mut LayoutSet) {
    pin_reference(set);
    for layout in set.layouts.iter_mut().skip(1) {
        if layout.inherit_common.is_none() {
            layout.inherit_common = Some(true);
        }
    }
}

/// Copy the reference snapshot onto every attached layout, returning how
/// many layouts received it
fn broadcast_reference(set: &mut LayoutSet) -> usize {
    let Some(reference) = set.layouts.first() else {
        return 0;
    };
    let snapshot = CommonFieldSnapshot::of(&reference.common);
    let mut receivers = 0;
    for layout in set.layouts.iter_mut().skip(1) {
        if layout.inherit_common != Some(false) {
            snapshot.apply_to(&mut layout.common);
            receivers += 1;
        }
    }
    receivers
}
