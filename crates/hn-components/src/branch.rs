//! Tagged union over the branch kinds a network is built from.

use crate::heat_exchanger::HeatExchanger;
use crate::pipe::Pipe;
use crate::pump::CirculationPump;
use crate::traits::BranchModel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`Branch`], used in results and log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    Pipe,
    CirculationPump,
    HeatExchanger,
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BranchKind::Pipe => "pipe",
            BranchKind::CirculationPump => "circulation_pump",
            BranchKind::HeatExchanger => "heat_exchanger",
        };
        f.write_str(s)
    }
}

/// A network branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Branch {
    Pipe(Pipe),
    CirculationPump(CirculationPump),
    HeatExchanger(HeatExchanger),
}

impl Branch {
    /// The model behind this branch.
    pub fn model(&self) -> &dyn BranchModel {
        match self {
            Branch::Pipe(p) => p,
            Branch::CirculationPump(p) => p,
            Branch::HeatExchanger(h) => h,
        }
    }

    pub fn kind(&self) -> BranchKind {
        self.model().kind()
    }
}

impl From<Pipe> for Branch {
    fn from(p: Pipe) -> Self {
        Branch::Pipe(p)
    }
}

impl From<CirculationPump> for Branch {
    fn from(p: CirculationPump) -> Self {
        Branch::CirculationPump(p)
    }
}

impl From<HeatExchanger> for Branch {
    fn from(h: HeatExchanger) -> Self {
        Branch::HeatExchanger(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{bar, k, kgps, m, mm, w};

    #[test]
    fn kinds_follow_variants() {
        let pipe: Branch = Pipe::new(m(10.0), m(0.1), mm(0.1)).unwrap().into();
        let pump: Branch = CirculationPump::new(kgps(1.0), bar(3.0), k(340.0)).unwrap().into();
        let hx: Branch = HeatExchanger::new(w(1.0e3), m(0.1)).unwrap().into();

        assert_eq!(pipe.kind(), BranchKind::Pipe);
        assert_eq!(pump.kind(), BranchKind::CirculationPump);
        assert_eq!(hx.kind(), BranchKind::HeatExchanger);
        assert!(pump.model().boundary().is_some());
        assert!(pipe.model().boundary().is_none());
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(BranchKind::CirculationPump.to_string(), "circulation_pump");
        assert_eq!(BranchKind::HeatExchanger.to_string(), "heat_exchanger");
    }
}
