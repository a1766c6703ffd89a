//! An `IrGen` that records what it was asked to emit.

use super::{BespokeOp, IrGen, LayoutData};

#[allow(dead_code, reason = "fields are inspected through PartialEq and Debug")]
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Emitted {
    Op {
        op: BespokeOp,
        data: LayoutData,
        srcs: Vec<u32>,
        out: u32,
    },
    CheckMissing {
        val: u32,
        taken: u32,
        out: u32,
    },
    Bool(bool, u32),
    Str(&'static str, u32),
}

#[derive(Default)]
pub(crate) struct Recorder {
    pub(crate) emitted: Vec<Emitted>,
    next: u32,
}

impl Recorder {
    /// Values `0..n` stand for the caller's inputs.
    pub(crate) fn with_inputs(n: u32) -> Self {
        Self {
            emitted: Vec::new(),
            next: n,
        }
    }

    fn fresh(&mut self) -> u32 {
        let t = self.next;
        self.next += 1;
        t
    }
}

impl IrGen for Recorder {
    type Tmp = u32;
    type Block = u32;

    fn gen(&mut self, op: BespokeOp, data: LayoutData, srcs: &[u32]) -> u32 {
        let out = self.fresh();
        self.emitted.push(Emitted::Op {
            op,
            data,
            srcs: srcs.to_vec(),
            out,
        });
        out
    }

    fn gen_check_missing(&mut self, val: u32, taken: u32) -> u32 {
        let out = self.fresh();
        self.emitted.push(Emitted::CheckMissing { val, taken, out });
        out
    }

    fn cns_bool(&mut self, b: bool) -> u32 {
        let out = self.fresh();
        self.emitted.push(Emitted::Bool(b, out));
        out
    }

    fn cns_str(&mut self, s: &'static str) -> u32 {
        let out = self.fresh();
        self.emitted.push(Emitted::Str(s, out));
        out
    }
}
