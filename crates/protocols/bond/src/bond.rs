//! Bond Entity
//!
//! Immutable snapshot of a tranche bond and its waterfall accounting:
//! deposit minting, redemption (live and matured), collateralization, and
//! the required-deposit inversion. All quantities are base-unit integers;
//! all division is truncating, in the contract's exact operation order.

use crate::state::{parse_amount, parse_int, parse_opt_amount, BondData};
use crate::tranche::Tranche;
use crate::waterfall;
use bulwark_core::{ChainId, Error, Ratio, Result, Token, TokenAmount};
use num_bigint::BigUint;
use num_traits::Zero;

#[derive(Debug, Clone)]
pub struct Bond {
    address: String,
    start_date: u64,
    scheduled_maturity_date: u64,
    matured_date: Option<u64>,
    is_mature: bool,
    collateral: Token,
    tranches: Vec<Tranche>,
    total_debt: BigUint,
    total_collateral: BigUint,
    total_debt_at_maturity: BigUint,
    total_collateral_at_maturity: BigUint,
    deposit_limit: BigUint,
}

impl Bond {
    /// Build a bond entity from an indexer snapshot.
    ///
    /// Tranches are re-sorted by ascending seniority index; the input
    /// order does not matter. Fewer than two tranches (one senior plus
    /// the residual) is not a bond.
    pub fn new(data: &BondData, chain_id: ChainId) -> Result<Self> {
        if data.tranches.len() < 2 {
            return Err(Error::invalid_structure(format!(
                "bond requires at least 2 tranches, got {}",
                data.tranches.len()
            )));
        }

        let decimals = parse_int::<u8>("collateral.decimals", &data.collateral.decimals)?;
        let collateral = Token::new(chain_id, data.collateral.id.clone(), decimals)
            .with_metadata(data.collateral.symbol.clone(), data.collateral.name.clone());

        let mut tranches = data
            .tranches
            .iter()
            .map(|t| Tranche::from_data(t, collateral.clone(), chain_id))
            .collect::<Result<Vec<_>>>()?;
        tranches.sort_by_key(|t| t.index());

        let matured_date = match &data.matured_date {
            Some(raw) => Some(parse_int::<u64>("maturedDate", raw)?),
            None => None,
        };

        Ok(Self {
            address: data.id.clone(),
            start_date: parse_int("startDate", &data.start_date)?,
            scheduled_maturity_date: parse_int("maturityDate", &data.maturity_date)?,
            matured_date,
            is_mature: data.is_mature,
            collateral,
            tranches,
            total_debt: parse_amount("totalDebt", &data.total_debt)?,
            total_collateral: parse_amount("totalCollateral", &data.total_collateral)?,
            total_debt_at_maturity: parse_opt_amount(
                "totalDebtAtMaturity",
                data.total_debt_at_maturity.as_ref(),
            )?,
            total_collateral_at_maturity: parse_opt_amount(
                "totalCollateralAtMaturity",
                data.total_collateral_at_maturity.as_ref(),
            )?,
            deposit_limit: parse_opt_amount("depositLimit", data.deposit_limit.as_ref())?,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_mature(&self) -> bool {
        self.is_mature
    }

    pub fn collateral(&self) -> &Token {
        &self.collateral
    }

    /// Tranches in seniority order; index 0 is most senior, the last is
    /// the residual.
    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }

    pub fn total_debt(&self) -> &BigUint {
        &self.total_debt
    }

    pub fn total_collateral(&self) -> &BigUint {
        &self.total_collateral
    }

    pub fn total_debt_at_maturity(&self) -> &BigUint {
        &self.total_debt_at_maturity
    }

    pub fn total_collateral_at_maturity(&self) -> &BigUint {
        &self.total_collateral_at_maturity
    }

    /// Cumulative collateral cap; zero means unlimited.
    pub fn deposit_limit(&self) -> &BigUint {
        &self.deposit_limit
    }

    pub fn start_date(&self) -> u64 {
        self.start_date
    }

    /// The actual maturity timestamp once matured, else the scheduled one.
    pub fn maturity_date(&self) -> u64 {
        if self.is_mature {
            self.matured_date.unwrap_or(0)
        } else {
            self.scheduled_maturity_date
        }
    }

    /// Bond-level collateral:debt ratio, from the frozen snapshot once
    /// mature. `0/1` when there is no debt.
    pub fn cdr(&self) -> Ratio {
        let (collateral, debt) = if self.is_mature {
            (&self.total_collateral_at_maturity, &self.total_debt_at_maturity)
        } else {
            (&self.total_collateral, &self.total_debt)
        };
        if debt.is_zero() {
            return Ratio::zero();
        }
        Ratio::new(collateral.clone(), debt.clone())
    }

    fn selected_collateral(&self) -> &BigUint {
        if self.is_mature {
            &self.total_collateral_at_maturity
        } else {
            &self.total_collateral
        }
    }

    fn selected_supply<'a>(&self, tranche: &'a Tranche) -> &'a BigUint {
        if self.is_mature {
            tranche.total_supply_at_maturity()
        } else {
            tranche.total_supply()
        }
    }

    fn tranche_position(&self, token: &Token) -> Option<usize> {
        self.tranches.iter().position(|t| t.token() == token)
    }

    /// The tranche whose token matches `token`, if any.
    pub fn tranche_for(&self, token: &Token) -> Option<&Tranche> {
        self.tranche_position(token).map(|i| &self.tranches[i])
    }

    /// Collateralization of one tranche: pretend every more-senior tranche
    /// is paid its full supply claim out of the collateral pool (floored at
    /// zero), then divide whatever remains by this tranche's own supply.
    /// `0/1` when the tranche has no supply.
    pub fn collateralization(&self, tranche_index: usize) -> Result<Ratio> {
        let tranche = self.tranches.get(tranche_index).ok_or_else(|| {
            Error::invalid_input(format!("no tranche at index {tranche_index}"))
        })?;

        let tranche_supply = self.selected_supply(tranche);
        if tranche_supply.is_zero() {
            return Ok(Ratio::zero());
        }

        let mut collateral = self.selected_collateral().clone();
        for senior in &self.tranches[..tranche_index] {
            let supply = self.selected_supply(senior);
            collateral = if &collateral < supply {
                BigUint::zero()
            } else {
                collateral - supply
            };
        }

        Ok(Ratio::new(collateral, tranche_supply.clone()))
    }

    /// Collateral value of redeeming `amount` of one tranche right now.
    ///
    /// Mature bonds delegate to the tranche's own proportional claim. Live
    /// bonds re-run the waterfall: each tranche senior to the input claims
    /// `min(remaining, supply)`; the residual tranche claims everything
    /// left after all the others.
    pub fn tranche_redeem_value(&self, amount: &TokenAmount) -> Result<TokenAmount> {
        let position = self.tranche_position(&amount.token).ok_or_else(|| {
            Error::invalid_input(format!(
                "amount currency {} is not a tranche of this bond",
                amount.token
            ))
        })?;

        if self.is_mature {
            return self.tranches[position].redeem_value(amount);
        }

        let mut remaining = self.total_collateral.clone();
        for (i, tranche) in self.tranches[..self.tranches.len() - 1].iter().enumerate() {
            let claim = waterfall::waterfall_claim(&remaining, tranche.total_supply());
            remaining -= &claim;

            if i == position {
                let out =
                    waterfall::proportional_share(&claim, &amount.amount, tranche.total_supply());
                return Ok(TokenAmount::new(self.collateral.clone(), out));
            }
        }

        let residual = &self.tranches[self.tranches.len() - 1];
        let out =
            waterfall::proportional_share(&remaining, &amount.amount, residual.total_supply());
        Ok(TokenAmount::new(self.collateral.clone(), out))
    }

    /// Tranche tokens minted, in seniority order, for depositing
    /// `collateral_input` into the bond.
    pub fn deposit(&self, collateral_input: &TokenAmount) -> Result<Vec<TokenAmount>> {
        if collateral_input.token != self.collateral {
            return Err(Error::invalid_input(format!(
                "deposit currency {} is not bond collateral {}",
                collateral_input.token, self.collateral
            )));
        }

        if !self.deposit_limit.is_zero() {
            let attempted = &self.total_collateral + &collateral_input.amount;
            if attempted > self.deposit_limit {
                return Err(Error::LimitExceeded {
                    limit: self.deposit_limit.clone(),
                    attempted,
                });
            }
        }

        Ok(self
            .tranches
            .iter()
            .map(|tranche| {
                let minted = waterfall::mint_amount(
                    &collateral_input.amount,
                    tranche.ratio(),
                    &self.total_debt,
                    &self.total_collateral,
                );
                TokenAmount::new(tranche.token().clone(), minted)
            })
            .collect())
    }

    /// Collateral deposit needed to mint `desired_tranche_output` of one
    /// tranche: the exact algebraic inverse of [`Bond::deposit`] for that
    /// tranche, subject to floor truncation.
    pub fn required_deposit(&self, desired_tranche_output: &TokenAmount) -> Result<TokenAmount> {
        let position = self
            .tranche_position(&desired_tranche_output.token)
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "desired output currency {} is not a tranche of this bond",
                    desired_tranche_output.token
                ))
            })?;

        let input = waterfall::required_input(
            &desired_tranche_output.amount,
            self.tranches[position].ratio(),
            &self.total_debt,
            &self.total_collateral,
        );
        Ok(TokenAmount::new(self.collateral.clone(), input))
    }

    /// Collateral returned for redeeming one tranche after maturity.
    pub fn redeem_mature(&self, tranche_amount: &TokenAmount) -> Result<TokenAmount> {
        if !self.is_mature {
            return Err(Error::NotMature);
        }

        let position = self.tranche_position(&tranche_amount.token).ok_or_else(|| {
            Error::invalid_input(format!(
                "amount currency {} is not a tranche of this bond",
                tranche_amount.token
            ))
        })?;
        let tranche = &self.tranches[position];

        if &tranche_amount.amount > tranche.total_collateral() {
            return Err(Error::InsufficientCollateral {
                required: tranche_amount.amount.clone(),
                available: tranche.total_collateral().clone(),
            });
        }

        let out = waterfall::proportional_share(
            tranche.total_collateral(),
            &tranche_amount.amount,
            tranche.total_supply(),
        );
        Ok(TokenAmount::new(self.collateral.clone(), out))
    }

    /// Collateral returned for a pre-maturity redemption of all tranches
    /// at once. Inputs must cover every tranche, in seniority order.
    pub fn redeem(&self, tranche_inputs: &[TokenAmount]) -> Result<TokenAmount> {
        if tranche_inputs.len() != self.tranches.len() {
            return Err(Error::invalid_input(format!(
                "expected {} tranche inputs, got {}",
                self.tranches.len(),
                tranche_inputs.len()
            )));
        }

        let mut total_debt_redeemed = BigUint::zero();
        for (input, tranche) in tranche_inputs.iter().zip(&self.tranches) {
            if &input.token != tranche.token() {
                return Err(Error::invalid_input(format!(
                    "tranche input {} out of order: expected {}",
                    input.token,
                    tranche.token()
                )));
            }
            total_debt_redeemed += &input.amount;
        }

        if total_debt_redeemed > self.total_collateral {
            return Err(Error::InsufficientCollateral {
                required: total_debt_redeemed,
                available: self.total_collateral.clone(),
            });
        }

        let out = if self.total_debt.is_zero() {
            BigUint::zero()
        } else {
            &total_debt_redeemed * &self.total_collateral / &self.total_debt
        };
        Ok(TokenAmount::new(self.collateral.clone(), out))
    }
}
