use super::W65C02;
use crate::core::Bus;

impl W65C02 {
    pub(crate) fn op_lda<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) {
        self.a = bus.read(addr);
        let a = self.a;
        self.set_nz(a);
    }

    pub(crate) fn op_ldx<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) {
        self.x = bus.read(addr);
        let x = self.x;
        self.set_nz(x);
    }

    pub(crate) fn op_ldy<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) {
        self.y = bus.read(addr);
        let y = self.y;
        self.set_nz(y);
    }
}
