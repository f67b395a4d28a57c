//! Frame field decomposition

use super::{varint, DataLoss, DecodeError};
use bytes::Bytes;

/// A decoded frame borrowing the decoder's reassembly buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    address: u64,
    control: u8,
    payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Split a complete, unescaped frame body into its fields
    ///
    /// `data` must not include the FCS.
    pub fn parse(data: &'a [u8]) -> Result<Self, DecodeError> {
        let (address, address_size) = varint::decode(data).ok_or(DataLoss::MalformedAddress)?;
        let (&control, payload) = data[address_size..]
            .split_first()
            .ok_or(DataLoss::MissingControl)?;

        Ok(Self {
            address,
            control,
            payload,
        })
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn control(&self) -> u8 {
        self.control
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Copy the frame out of the decoder buffer
    pub fn to_decoded(&self) -> DecodedFrame {
        DecodedFrame {
            address: self.address,
            control: self.control,
            payload: Bytes::copy_from_slice(self.payload),
        }
    }
}

/// Owned copy of a [`Frame`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub address: u64,
    pub control: u8,
    pub payload: Bytes,
}
