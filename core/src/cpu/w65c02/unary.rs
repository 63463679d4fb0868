use super::W65C02;
use crate::core::Bus;

impl W65C02 {
    pub(crate) fn op_inc_a(&mut self) {
        self.a = self.a.wrapping_add(1);
        let a = self.a;
        self.set_nz(a);
    }

    pub(crate) fn op_dec_a(&mut self) {
        self.a = self.a.wrapping_sub(1);
        let a = self.a;
        self.set_nz(a);
    }

    pub(crate) fn op_inc_m<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) {
        let result = bus.read(addr).wrapping_add(1);
        bus.write(addr, result);
        self.set_nz(result);
    }

    pub(crate) fn op_dec_m<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) {
        let result = bus.read(addr).wrapping_sub(1);
        bus.write(addr, result);
        self.set_nz(result);
    }
}
