use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Uint128};
use thiserror::Error;

use crate::{is_null_addr, MAX_ASSETS};

/// A caller's request to convert a basket of input assets into one output asset
///
/// The three input sequences are parallel: index `i` of each describes one leg.
/// They are kept as separate sequences so a malformed request (mismatched
/// lengths) can be represented and rejected rather than being unrepresentable.
#[cw_serde]
pub struct ConversionRequest {
    /// Exchange that executes every leg
    pub exchange: Addr,

    /// Input asset per leg
    pub input_assets: Vec<Addr>,

    /// Amount pulled from the caller per leg
    pub input_amounts: Vec<Uint128>,

    /// Opaque exchange instruction per leg
    pub instructions: Vec<Binary>,

    /// Asset every leg converts into
    pub output_asset: Addr,

    /// Slippage floor on the total output before fees
    pub min_output: Uint128,
}

/// Borrowed view over one leg of a request
#[derive(Debug, Clone, Copy)]
pub struct SwapLeg<'a> {
    pub index: usize,
    pub asset: &'a Addr,
    pub amount: Uint128,
    pub instruction: &'a Binary,
}

impl SwapLeg<'_> {
    /// Per-leg checks, performed when the leg is reached
    pub fn validate(&self) -> Result<(), RequestError> {
        if is_null_addr(self.asset) {
            return Err(RequestError::InvalidAsset { index: self.index });
        }
        if self.amount.is_zero() {
            return Err(RequestError::ZeroAmount { index: self.index });
        }
        Ok(())
    }
}

impl ConversionRequest {
    /// Start building a request against `exchange` that pays out in `output_asset`
    pub fn builder(
        exchange: impl Into<String>,
        output_asset: impl Into<String>,
    ) -> ConversionRequestBuilder {
        ConversionRequestBuilder {
            exchange: Addr::unchecked(exchange.into()),
            output_asset: Addr::unchecked(output_asset.into()),
            input_assets: Vec::new(),
            input_amounts: Vec::new(),
            instructions: Vec::new(),
            min_output: Uint128::zero(),
        }
    }

    /// Number of legs, as given by the asset sequence
    pub fn len(&self) -> usize {
        self.input_assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_assets.is_empty()
    }

    /// Request-level checks, in the order they are enforced
    pub fn validate_shape(&self) -> Result<(), RequestError> {
        let assets = self.input_assets.len();
        let amounts = self.input_amounts.len();
        let instructions = self.instructions.len();

        if assets != amounts || assets != instructions {
            return Err(RequestError::LengthMismatch {
                assets,
                amounts,
                instructions,
            });
        }
        if assets == 0 {
            return Err(RequestError::Empty);
        }
        if assets > MAX_ASSETS {
            return Err(RequestError::TooManyAssets {
                count: assets,
                max: MAX_ASSETS,
            });
        }
        if is_null_addr(&self.output_asset) {
            return Err(RequestError::InvalidOutputAsset);
        }
        if is_null_addr(&self.exchange) {
            return Err(RequestError::InvalidExchange);
        }
        Ok(())
    }

    /// Iterate the legs in request order
    ///
    /// Only meaningful after `validate_shape`; on mismatched lengths the
    /// iterator stops at the shortest sequence.
    pub fn legs(&self) -> impl Iterator<Item = SwapLeg<'_>> {
        self.input_assets
            .iter()
            .zip(self.input_amounts.iter())
            .zip(self.instructions.iter())
            .enumerate()
            .map(|(index, ((asset, amount), instruction))| SwapLeg {
                index,
                asset,
                amount: *amount,
                instruction,
            })
    }
}

/// Builder for conversion requests
pub struct ConversionRequestBuilder {
    exchange: Addr,
    output_asset: Addr,
    input_assets: Vec<Addr>,
    input_amounts: Vec<Uint128>,
    instructions: Vec<Binary>,
    min_output: Uint128,
}

impl ConversionRequestBuilder {
    pub fn leg(
        mut self,
        asset: impl Into<String>,
        amount: u128,
        instruction: impl Into<Binary>,
    ) -> Self {
        self.input_assets.push(Addr::unchecked(asset.into()));
        self.input_amounts.push(Uint128::new(amount));
        self.instructions.push(instruction.into());
        self
    }

    pub fn min_output(mut self, min_output: u128) -> Self {
        self.min_output = Uint128::new(min_output);
        self
    }

    pub fn build(self) -> ConversionRequest {
        ConversionRequest {
            exchange: self.exchange,
            input_assets: self.input_assets,
            input_amounts: self.input_amounts,
            instructions: self.instructions,
            output_asset: self.output_asset,
            min_output: self.min_output,
        }
    }
}

/// Request-shape violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("length mismatch: {assets} assets, {amounts} amounts, {instructions} instructions")]
    LengthMismatch {
        assets: usize,
        amounts: usize,
        instructions: usize,
    },

    #[error("request contains no assets")]
    Empty,

    #[error("too many assets: {count} (max {max})")]
    TooManyAssets { count: usize, max: usize },

    #[error("invalid output asset")]
    InvalidOutputAsset,

    #[error("invalid exchange address")]
    InvalidExchange,

    #[error("invalid asset at index {index}")]
    InvalidAsset { index: usize },

    #[error("zero amount at index {index}")]
    ZeroAmount { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_legs(n: usize) -> ConversionRequest {
        (0..n)
            .fold(
                ConversionRequest::builder("exchange", "uusdc"),
                |builder, i| builder.leg(format!("asset-{i}"), 100, b"{}".to_vec()),
            )
            .build()
    }

    #[test]
    fn test_valid_shape() {
        assert_eq!(request_with_legs(1).validate_shape(), Ok(()));
        assert_eq!(request_with_legs(MAX_ASSETS).validate_shape(), Ok(()));
    }

    #[test]
    fn test_length_mismatch_checked_first() {
        let mut request = request_with_legs(0);
        request.input_amounts.push(Uint128::new(1));
        request.output_asset = Addr::unchecked("");

        assert_eq!(
            request.validate_shape(),
            Err(RequestError::LengthMismatch {
                assets: 0,
                amounts: 1,
                instructions: 0
            })
        );
    }

    #[test]
    fn test_empty_and_oversized() {
        assert_eq!(request_with_legs(0).validate_shape(), Err(RequestError::Empty));
        assert_eq!(
            request_with_legs(MAX_ASSETS + 1).validate_shape(),
            Err(RequestError::TooManyAssets {
                count: MAX_ASSETS + 1,
                max: MAX_ASSETS
            })
        );
    }

    #[test]
    fn test_output_checked_before_exchange() {
        let mut request = request_with_legs(2);
        request.output_asset = Addr::unchecked("");
        request.exchange = Addr::unchecked("");
        assert_eq!(request.validate_shape(), Err(RequestError::InvalidOutputAsset));

        request.output_asset = Addr::unchecked("uusdc");
        assert_eq!(request.validate_shape(), Err(RequestError::InvalidExchange));
    }

    #[test]
    fn test_leg_validation() {
        let request = ConversionRequest::builder("exchange", "uusdc")
            .leg("uatom", 10, Vec::new())
            .leg("", 10, Vec::new())
            .leg("uosmo", 0, Vec::new())
            .build();

        let results: Vec<_> = request.legs().map(|leg| leg.validate()).collect();
        assert_eq!(results[0], Ok(()));
        assert_eq!(results[1], Err(RequestError::InvalidAsset { index: 1 }));
        assert_eq!(results[2], Err(RequestError::ZeroAmount { index: 2 }));
    }

    #[test]
    fn test_json_shape() {
        let request = ConversionRequest::builder("exchange", "uusdc")
            .leg("uatom", 10, b"route".to_vec())
            .min_output(9)
            .build();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["exchange"], "exchange");
        assert_eq!(json["input_amounts"][0], "10");
        assert_eq!(json["min_output"], "9");
    }
}
