// ── Tick planning ──
//
// The diff between tracked state and the live snapshot, as data. A plan
// is computed without touching anything, then applied in one storage
// transaction by `Store::apply_tick`. Re-running a plan computation on
// unchanged inputs yields no history operations and no transitions, which
// is what makes the engine idempotent under crash-and-restart: every tick
// is driven by current state, never by accumulated deltas.

use chrono::{DateTime, Utc};

use roamwatch_api::{Association, AssociationSnapshot};

use crate::model::{ApRef, MacAddress, TrackedDevice, Transition, TransitionKind};

/// Authoritative next values for a device's connection-owned columns.
/// Applied as a whole -- the planner carries forward anything unchanged.
#[derive(Debug, Clone)]
pub struct DeviceFields {
    pub is_connected: bool,
    pub ap_mac: Option<MacAddress>,
    pub ap_name: Option<String>,
    pub ip: Option<String>,
    pub signal_dbm: Option<i64>,
    pub last_seen: Option<DateTime<Utc>>,
}

/// History mutations for one device, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOp {
    /// Close the open entry (if any) at the plan's timestamp, computing
    /// its duration. A no-op when nothing is open.
    CloseOpen,
    /// Open a new entry for the given AP at the plan's timestamp.
    Open {
        ap_mac: MacAddress,
        ap_name: Option<String>,
        signal_dbm: Option<i64>,
    },
}

/// Everything that changes for one device this tick.
#[derive(Debug, Clone)]
pub struct DeviceChange {
    pub device_id: i64,
    pub fields: DeviceFields,
    pub history: Vec<HistoryOp>,
}

/// The full outcome of diffing one site's tracked devices against a
/// live snapshot.
#[derive(Debug, Clone)]
pub struct TickPlan {
    pub site: String,
    pub now: DateTime<Utc>,
    pub changes: Vec<DeviceChange>,
    pub transitions: Vec<Transition>,
}

impl TickPlan {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Diff every tracked device against the live snapshot.
///
/// Stations present in the snapshot but not tracked are ignored: the
/// engine only reconciles devices the user explicitly added.
pub fn plan(
    site: &str,
    devices: &[TrackedDevice],
    snapshot: &AssociationSnapshot,
    now: DateTime<Utc>,
) -> TickPlan {
    let mut changes = Vec::new();
    let mut transitions = Vec::new();

    for device in devices {
        match snapshot.get(device.mac.as_str()) {
            Some(assoc) => plan_present(device, assoc, now, &mut changes, &mut transitions),
            None => plan_absent(device, now, &mut changes, &mut transitions),
        }
    }

    TickPlan {
        site: site.to_owned(),
        now,
        changes,
        transitions,
    }
}

fn current_ap_ref(device: &TrackedDevice) -> Option<ApRef> {
    device.current_ap_mac.clone().map(|mac| ApRef {
        mac,
        name: device.current_ap_name.clone(),
    })
}

fn transition(device: &TrackedDevice, kind: TransitionKind, now: DateTime<Utc>) -> Transition {
    Transition {
        device_id: device.id,
        mac: device.mac.clone(),
        device_name: device.name.clone(),
        site: device.site.clone(),
        kind,
        old_ap: None,
        new_ap: None,
        offline_secs: None,
        at: now,
    }
}

/// The device appears in the snapshot.
fn plan_present(
    device: &TrackedDevice,
    assoc: &Association,
    now: DateTime<Utc>,
    changes: &mut Vec<DeviceChange>,
    transitions: &mut Vec<Transition>,
) {
    let new_ap_mac = assoc.ap_mac.as_deref().map(MacAddress::new);
    let new_signal = assoc.signal_dbm.map(i64::from);
    let new_ap_ref = new_ap_mac.clone().map(|mac| ApRef {
        mac,
        name: assoc.ap_name.clone(),
    });

    // The AP association only counts as changed when the snapshot actually
    // names an AP. A present station with no AP identifier keeps whatever
    // the device already had.
    let ap_changed = new_ap_mac.is_some() && new_ap_mac != device.current_ap_mac;

    let (ap_mac, ap_name) = if ap_changed {
        (new_ap_mac.clone(), assoc.ap_name.clone())
    } else {
        (
            device.current_ap_mac.clone(),
            device.current_ap_name.clone(),
        )
    };

    let fields = DeviceFields {
        is_connected: true,
        ap_mac,
        ap_name,
        ip: assoc.ip.clone().or_else(|| device.current_ip.clone()),
        signal_dbm: new_signal,
        last_seen: Some(now),
    };

    let mut history = Vec::new();

    if !device.is_connected {
        // Absent -> present.
        if let Some(op) = open_op(assoc, new_signal) {
            history.push(HistoryOp::CloseOpen);
            history.push(op);
        }
        let mut t = transition(device, TransitionKind::Connected, now);
        t.new_ap = new_ap_ref;
        transitions.push(t);
    } else if ap_changed {
        // Present on a different AP: roam.
        history.push(HistoryOp::CloseOpen);
        if let Some(op) = open_op(assoc, new_signal) {
            history.push(op);
        }
        let mut t = transition(device, TransitionKind::Roamed, now);
        t.old_ap = current_ap_ref(device);
        t.new_ap = new_ap_ref;
        transitions.push(t);
    }
    // Present, same AP: field refresh only, no history, no transition.

    changes.push(DeviceChange {
        device_id: device.id,
        fields,
        history,
    });
}

fn open_op(assoc: &Association, signal_dbm: Option<i64>) -> Option<HistoryOp> {
    assoc.ap_mac.as_deref().map(|mac| HistoryOp::Open {
        ap_mac: MacAddress::new(mac),
        ap_name: assoc.ap_name.clone(),
        signal_dbm,
    })
}

/// The device is missing from the snapshot.
fn plan_absent(
    device: &TrackedDevice,
    now: DateTime<Utc>,
    changes: &mut Vec<DeviceChange>,
    transitions: &mut Vec<Transition>,
) {
    if !device.is_connected {
        // Already known offline: nothing to do.
        return;
    }

    let fields = DeviceFields {
        is_connected: false,
        ap_mac: None,
        ap_name: None,
        ip: device.current_ip.clone(),
        signal_dbm: None,
        last_seen: device.last_seen,
    };

    let mut t = transition(device, TransitionKind::Disconnected, now);
    t.old_ap = current_ap_ref(device);
    t.offline_secs = device
        .last_seen
        .map(|seen| (now - seen).num_seconds().max(0));
    transitions.push(t);

    changes.push(DeviceChange {
        device_id: device.id,
        fields,
        history: vec![HistoryOp::CloseOpen],
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use roamwatch_api::AssociationSnapshot;

    fn t0() -> DateTime<Utc> {
        "2026-03-01T08:00:00Z".parse().unwrap()
    }

    fn device(connected: bool, ap: Option<&str>) -> TrackedDevice {
        TrackedDevice {
            id: 1,
            mac: MacAddress::new("aa:bb:cc:dd:ee:ff"),
            name: Some("Kitchen Tablet".into()),
            site: "default".into(),
            is_connected: connected,
            current_ap_mac: ap.map(MacAddress::new),
            current_ap_name: ap.map(|_| "AP X".to_owned()),
            current_ip: connected.then(|| "10.0.0.21".to_owned()),
            current_signal_dbm: connected.then_some(-60),
            last_seen: connected.then(t0),
            added_at: t0(),
        }
    }

    fn assoc(ap: &str, ap_name: Option<&str>) -> Association {
        Association {
            mac: "aa:bb:cc:dd:ee:ff".into(),
            ap_mac: Some(ap.into()),
            ap_name: ap_name.map(str::to_owned),
            ip: Some("10.0.0.21".into()),
            hostname: None,
            name: None,
            signal_dbm: Some(-58),
            is_wired: false,
            tx_bytes: None,
            rx_bytes: None,
        }
    }

    fn snapshot(entries: Vec<Association>) -> AssociationSnapshot {
        AssociationSnapshot::new(entries)
    }

    #[test]
    fn first_appearance_connects_and_opens() {
        let devices = vec![device(false, None)];
        let snap = snapshot(vec![assoc("0a:0b:0c:0d:0e:0f", Some("AP X"))]);

        let plan = plan("default", &devices, &snap, t0());

        assert_eq!(plan.changes.len(), 1);
        let change = &plan.changes[0];
        assert!(change.fields.is_connected);
        assert_eq!(change.fields.last_seen, Some(t0()));
        assert_eq!(
            change.history,
            vec![
                HistoryOp::CloseOpen,
                HistoryOp::Open {
                    ap_mac: MacAddress::new("0a:0b:0c:0d:0e:0f"),
                    ap_name: Some("AP X".into()),
                    signal_dbm: Some(-58),
                }
            ]
        );

        assert_eq!(plan.transitions.len(), 1);
        assert_eq!(plan.transitions[0].kind, TransitionKind::Connected);
        assert_eq!(
            plan.transitions[0].new_ap.as_ref().unwrap().label(),
            "AP X"
        );
    }

    #[test]
    fn absent_on_first_tick_is_a_noop() {
        let devices = vec![device(false, None)];
        let snap = snapshot(vec![]);

        let plan = plan("default", &devices, &snap, t0());

        assert!(plan.is_empty());
        assert!(plan.transitions.is_empty());
    }

    #[test]
    fn same_ap_refreshes_fields_without_history() {
        let devices = vec![device(true, Some("0a:0b:0c:0d:0e:0f"))];
        let snap = snapshot(vec![assoc("0a:0b:0c:0d:0e:0f", Some("AP X"))]);

        let plan = plan("default", &devices, &snap, t0() + TimeDelta::seconds(60));

        assert_eq!(plan.changes.len(), 1);
        assert!(plan.changes[0].history.is_empty());
        assert!(plan.transitions.is_empty());
        assert_eq!(
            plan.changes[0].fields.last_seen,
            Some(t0() + TimeDelta::seconds(60))
        );
    }

    #[test]
    fn idempotent_under_repeat() {
        // Second tick with the device already marked connected on the
        // same AP: no history ops, no transitions.
        let devices = vec![device(true, Some("0a:0b:0c:0d:0e:0f"))];
        let snap = snapshot(vec![assoc("0a:0b:0c:0d:0e:0f", Some("AP X"))]);

        let first = plan("default", &devices, &snap, t0());
        let second = plan("default", &devices, &snap, t0());

        for p in [first, second] {
            assert!(p.transitions.is_empty());
            assert!(p.changes.iter().all(|c| c.history.is_empty()));
        }
    }

    #[test]
    fn ap_change_is_a_roam() {
        let devices = vec![device(true, Some("0a:0b:0c:0d:0e:0f"))];
        let snap = snapshot(vec![assoc("0a:0b:0c:0d:0e:1f", Some("AP Y"))]);

        let plan = plan("default", &devices, &snap, t0() + TimeDelta::seconds(60));

        assert_eq!(plan.transitions.len(), 1);
        let t = &plan.transitions[0];
        assert_eq!(t.kind, TransitionKind::Roamed);
        assert_eq!(t.old_ap.as_ref().unwrap().label(), "AP X");
        assert_eq!(t.new_ap.as_ref().unwrap().label(), "AP Y");

        let change = &plan.changes[0];
        assert_eq!(change.history.len(), 2);
        assert_eq!(change.history[0], HistoryOp::CloseOpen);
        assert!(matches!(
            &change.history[1],
            HistoryOp::Open { ap_mac, .. } if ap_mac.as_str() == "0a:0b:0c:0d:0e:1f"
        ));
    }

    #[test]
    fn missing_ap_identifier_is_not_a_roam() {
        let devices = vec![device(true, Some("0a:0b:0c:0d:0e:0f"))];
        let mut a = assoc("ignored", None);
        a.ap_mac = None;
        let snap = snapshot(vec![a]);

        let plan = plan("default", &devices, &snap, t0());

        assert!(plan.transitions.is_empty());
        let change = &plan.changes[0];
        assert!(change.history.is_empty());
        // AP fields carried forward untouched.
        assert_eq!(
            change.fields.ap_mac,
            Some(MacAddress::new("0a:0b:0c:0d:0e:0f"))
        );
        assert_eq!(change.fields.ap_name.as_deref(), Some("AP X"));
    }

    #[test]
    fn disappearance_disconnects_and_closes() {
        let devices = vec![device(true, Some("0a:0b:0c:0d:0e:0f"))];
        let snap = snapshot(vec![]);
        let now = t0() + TimeDelta::seconds(60);

        let plan = plan("default", &devices, &snap, now);

        assert_eq!(plan.transitions.len(), 1);
        let t = &plan.transitions[0];
        assert_eq!(t.kind, TransitionKind::Disconnected);
        assert_eq!(t.old_ap.as_ref().unwrap().label(), "AP X");
        assert_eq!(t.offline_secs, Some(60));

        let change = &plan.changes[0];
        assert!(!change.fields.is_connected);
        assert_eq!(change.fields.ap_mac, None);
        assert_eq!(change.fields.ap_name, None);
        // last_seen is preserved, not cleared.
        assert_eq!(change.fields.last_seen, Some(t0()));
        assert_eq!(change.history, vec![HistoryOp::CloseOpen]);
    }

    #[test]
    fn untracked_stations_are_ignored() {
        let devices = vec![device(false, None)];
        let mut stranger = assoc("0a:0b:0c:0d:0e:0f", None);
        stranger.mac = "11:22:33:44:55:66".into();
        let snap = snapshot(vec![stranger]);

        let plan = plan("default", &devices, &snap, t0());

        assert!(plan.is_empty());
    }

    #[test]
    fn lookup_is_case_and_separator_insensitive() {
        let mut d = device(false, None);
        d.mac = MacAddress::new("AA-BB-CC-DD-EE-FF");
        let snap = snapshot(vec![assoc("0a:0b:0c:0d:0e:0f", None)]);

        let plan = plan("default", &[d], &snap, t0());

        assert_eq!(plan.transitions.len(), 1);
        assert_eq!(plan.transitions[0].kind, TransitionKind::Connected);
    }

    #[test]
    fn connect_roam_disconnect_round_trip() {
        // Tick 1: on AP X.
        let snap_x = snapshot(vec![assoc("0a:0b:0c:0d:0e:0f", Some("AP X"))]);
        let p1 = plan("default", &[device(false, None)], &snap_x, t0());
        assert_eq!(p1.transitions[0].kind, TransitionKind::Connected);

        // Tick 2: on AP Y.
        let snap_y = snapshot(vec![assoc("0a:0b:0c:0d:0e:1f", Some("AP Y"))]);
        let p2 = plan(
            "default",
            &[device(true, Some("0a:0b:0c:0d:0e:0f"))],
            &snap_y,
            t0() + TimeDelta::seconds(60),
        );
        assert_eq!(p2.transitions[0].kind, TransitionKind::Roamed);

        // Tick 3: gone.
        let mut d = device(true, Some("0a:0b:0c:0d:0e:1f"));
        d.last_seen = Some(t0() + TimeDelta::seconds(60));
        let p3 = plan(
            "default",
            &[d],
            &snapshot(vec![]),
            t0() + TimeDelta::seconds(120),
        );
        assert_eq!(p3.transitions[0].kind, TransitionKind::Disconnected);
        assert_eq!(p3.transitions[0].offline_secs, Some(60));

        // One event of each kind across the sequence.
        let kinds: Vec<TransitionKind> = [&p1, &p2, &p3]
            .iter()
            .flat_map(|p| p.transitions.iter().map(|t| t.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                TransitionKind::Connected,
                TransitionKind::Roamed,
                TransitionKind::Disconnected
            ]
        );
    }
}
