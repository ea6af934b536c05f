//! Pin-level bit masks of the FT232R bit-bang port.

use bitflags::bitflags;

bitflags! {
    /// One flag per pin of the 8-bit port.
    ///
    /// OUT0-OUT5 drive the H-bridges, IN6/IN7 are the sensor lines.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PortBits: u8 {
        /// TXD
        const OUT0 = 0x01;
        /// RXD
        const OUT1 = 0x02;
        /// RTS#
        const OUT2 = 0x04;
        /// CTS#
        const OUT3 = 0x08;
        /// DTR#
        const OUT4 = 0x10;
        /// DSR#
        const OUT5 = 0x20;
        /// DCD#, primary sensor
        const IN6  = 0x40;
        /// RI#, secondary sensor
        const IN7  = 0x80;

        /// All software-driven pins.
        const OUTPUTS = Self::OUT0.bits() | Self::OUT1.bits() | Self::OUT2.bits()
            | Self::OUT3.bits() | Self::OUT4.bits() | Self::OUT5.bits();
        /// All externally driven pins.
        const INPUTS = Self::IN6.bits() | Self::IN7.bits();
    }
}
