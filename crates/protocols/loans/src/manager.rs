//! Loan Manager
//!
//! Plans tranche-token sales against a set of swap venues. Borrowing
//! against a bond means depositing collateral, minting the full tranche
//! stack, and selling some of it for the output currency; the planner
//! walks tranches senior to junior and sells just enough to hit a target,
//! since senior tranches trade at the smallest discount.

use crate::constants::DISCOUNT_PRECISION;
use crate::state::{BorrowOutput, Sale, SalesOptions};
use crate::venue::SwapVenue;
use bond::{Bond, TRANCHE_RATIO_GRANULARITY};
use bulwark_core::{Error, Ratio, Result, Token, TokenAmount};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

pub struct LoanManager<'a> {
    bond: &'a Bond,
    venues: &'a [Box<dyn SwapVenue>],
    currency: Token,
}

impl std::fmt::Debug for LoanManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoanManager")
            .field("bond", &self.bond)
            .field("venues", &self.venues.len())
            .field("currency", &self.currency)
            .finish()
    }
}

impl<'a> LoanManager<'a> {
    /// Pair a bond with one venue per non-residual tranche, in seniority
    /// order. Each venue must trade its tranche's token; the shared
    /// non-tranche side of the pairs becomes the manager's output currency.
    pub fn new(bond: &'a Bond, venues: &'a [Box<dyn SwapVenue>]) -> Result<Self> {
        if venues.is_empty() || venues.len() != bond.tranches().len() - 1 {
            return Err(Error::invalid_structure(format!(
                "expected {} venues for {} tranches, got {}",
                bond.tranches().len() - 1,
                bond.tranches().len(),
                venues.len()
            )));
        }

        let mut currency: Option<Token> = None;
        for (i, (venue, tranche)) in venues.iter().zip(bond.tranches()).enumerate() {
            let other = venue.counterpart(tranche.token()).map_err(|_| {
                Error::invalid_structure(format!(
                    "venue {i} does not trade tranche token {}",
                    tranche.token()
                ))
            })?;

            match &currency {
                Some(existing) if existing != other => {
                    return Err(Error::invalid_structure(format!(
                        "venue {i} settles in {other}, expected {existing}"
                    )));
                }
                _ => currency = Some(other.clone()),
            }
        }

        // venues is nonempty, so a currency was always derived
        let currency =
            currency.ok_or_else(|| Error::invalid_structure("no output currency derived"))?;

        Ok(Self {
            bond,
            venues,
            currency,
        })
    }

    pub fn bond(&self) -> &Bond {
        self.bond
    }

    /// The single output currency shared by every venue.
    pub fn currency(&self) -> &Token {
        &self.currency
    }

    fn ensure_currency(&self, amount: &TokenAmount) -> Result<()> {
        if amount.token != self.currency {
            return Err(Error::invalid_input(format!(
                "currency {} does not match venue currency {}",
                amount.token, self.currency
            )));
        }
        Ok(())
    }

    /// Spot price of tranche `tranche_index`'s token in the output currency.
    pub fn tranche_price(&self, tranche_index: usize) -> Result<Ratio> {
        let venue = self.venues.get(tranche_index).ok_or_else(|| {
            Error::invalid_input(format!("no venue for tranche {tranche_index}"))
        })?;
        venue.spot_price(self.bond.tranches()[tranche_index].token())
    }

    /// Aggregate discount of a sale plan: quote every leg, then compare the
    /// total tranche tokens sold against the total currency received, with
    /// the lower-precision side scaled up to the other's decimals.
    ///
    /// Truncated to five decimal digits over [`DISCOUNT_PRECISION`].
    /// Negative means the plan trades at a premium.
    pub async fn discount(&self, sales: &[TokenAmount]) -> Result<Ratio> {
        // a full plan carries a trailing zero for the residual tranche;
        // anything past the venue list is ignored
        if sales.len() < self.venues.len() {
            return Err(Error::invalid_input(format!(
                "expected at least {} sales, got {}",
                self.venues.len(),
                sales.len()
            )));
        }

        let mut total_in = BigUint::zero();
        let mut total_out = BigUint::zero();
        for (sale, venue) in sales.iter().zip(self.venues) {
            let out = venue.quote_output(sale).await?;
            total_in += &sale.amount;
            total_out += &out.amount;
        }

        let currency_decimals = self.currency.decimals;
        let collateral_decimals = self.bond.collateral().decimals;
        if currency_decimals < collateral_decimals {
            total_out *= BigUint::from(10u32).pow(u32::from(collateral_decimals - currency_decimals));
        } else if currency_decimals > collateral_decimals {
            total_in *= BigUint::from(10u32).pow(u32::from(currency_decimals - collateral_decimals));
        }

        if total_out.is_zero() {
            return Err(Error::NoLiquidity);
        }

        // BigInt division truncates toward zero, matching the five-digit
        // fixed point upstream consumers expect
        let spread = (BigInt::from(total_in) - BigInt::from(total_out.clone()))
            * BigInt::from(DISCOUNT_PRECISION)
            / BigInt::from(total_out);

        Ok(Ratio::new(spread, DISCOUNT_PRECISION))
    }

    /// Sale plan realizing `desired_output` from depositing `deposit`.
    ///
    /// Mints the tranche stack for the deposit, then walks senior to
    /// junior with a running output: a tranche whose full mint still
    /// leaves the target short is sold whole; the first tranche that can
    /// cover the gap is sold for exactly the inverse quote; everything
    /// after records a zero sale. Fails with `InsufficientDeposit` when
    /// even selling every venue-backed tranche cannot reach the target.
    pub async fn sales(
        &self,
        desired_output: &TokenAmount,
        deposit: &TokenAmount,
        options: SalesOptions,
    ) -> Result<Vec<Sale>> {
        self.ensure_currency(desired_output)?;
        let minted = self.bond.deposit(deposit)?;

        let mut plan = Vec::with_capacity(self.bond.tranches().len());
        let mut running = BigUint::zero();
        for (i, tranche) in self.bond.tranches().iter().enumerate() {
            // the residual tranche has no venue and is never sold
            if i >= self.venues.len() || running >= desired_output.amount {
                plan.push(Sale::Amount(TokenAmount::zero(tranche.token().clone())));
                continue;
            }

            let venue = &self.venues[i];
            let max_output = venue.quote_output(&minted[i]).await?;

            if &running + &max_output.amount < desired_output.amount {
                tracing::debug!(
                    tranche = i,
                    sold = %minted[i].amount,
                    received = %max_output.amount,
                    "selling full tranche mint"
                );
                running += &max_output.amount;
                if options.contract_input {
                    plan.push(Sale::SellAll(tranche.token().clone()));
                } else {
                    plan.push(Sale::Amount(minted[i].clone()));
                }
            } else {
                let gap =
                    TokenAmount::new(self.currency.clone(), &desired_output.amount - &running);
                let input = venue.quote_input(&gap).await?;
                tracing::debug!(
                    tranche = i,
                    sold = %input.amount,
                    received = %gap.amount,
                    "selling partial tranche mint"
                );
                plan.push(Sale::Amount(input));
                running = desired_output.amount.clone();
            }
        }

        if running < desired_output.amount {
            return Err(Error::InsufficientDeposit {
                desired: desired_output.amount.clone(),
                reachable: running,
            });
        }

        Ok(plan)
    }

    /// Deposit needed to realize `desired_output` by selling only the most
    /// senior tranche. This is the most collateral the target could ever
    /// need; extra collateral beyond it buys nothing.
    pub async fn maximum_required_deposit(
        &self,
        desired_output: &TokenAmount,
    ) -> Result<TokenAmount> {
        self.ensure_currency(desired_output)?;
        let senior_in = self.venues[0].quote_input(desired_output).await?;
        self.bond.required_deposit(&senior_in)
    }

    /// Deposit needed when every venue-backed tranche gets sold.
    ///
    /// Approximate: sized off the second-most-junior tranche alone, so the
    /// realized output can come in slightly above the target. Less
    /// collateral than this cannot reach the target at all.
    pub async fn minimum_required_deposit(
        &self,
        desired_output: &TokenAmount,
    ) -> Result<TokenAmount> {
        self.ensure_currency(desired_output)?;

        let junior = self.bond.tranches().len() - 2;
        let ratio = self.bond.tranches()[junior].ratio();
        let junior_share = TokenAmount::new(
            self.currency.clone(),
            &desired_output.amount * BigUint::from(ratio)
                / BigUint::from(TRANCHE_RATIO_GRANULARITY),
        );

        let junior_in = self.venues[junior].quote_input(&junior_share).await?;
        self.bond.required_deposit(&junior_in)
    }

    /// Deposit `collateral` and liquidate every venue-backed tranche in
    /// full; the borrower keeps only the residual tranche plus the summed
    /// currency proceeds.
    pub async fn borrow_max(&self, collateral: &TokenAmount) -> Result<BorrowOutput> {
        let minted = self.bond.deposit(collateral)?;

        let mut currency_output = BigUint::zero();
        let mut tranche_tokens = Vec::with_capacity(minted.len());
        for (i, venue) in self.venues.iter().enumerate() {
            let out = venue.quote_output(&minted[i]).await?;
            currency_output += out.amount;
            tranche_tokens.push(TokenAmount::zero(minted[i].token.clone()));
        }
        tranche_tokens.push(minted[minted.len() - 1].clone());

        Ok(BorrowOutput {
            tranche_tokens,
            currency_output: TokenAmount::new(self.currency.clone(), currency_output),
        })
    }

    /// Deposit `collateral` and sell a caller-chosen amount of each
    /// venue-backed tranche; unsold mints stay with the borrower. Every
    /// sale must fit within the corresponding minted amount.
    pub async fn borrow(
        &self,
        collateral: &TokenAmount,
        sales: &[TokenAmount],
    ) -> Result<BorrowOutput> {
        if sales.len() != self.venues.len() {
            return Err(Error::invalid_input(format!(
                "expected {} sales, got {}",
                self.venues.len(),
                sales.len()
            )));
        }

        let minted = self.bond.deposit(collateral)?;

        let mut currency_output = BigUint::zero();
        let mut tranche_tokens = Vec::with_capacity(minted.len());
        for (i, venue) in self.venues.iter().enumerate() {
            let sale = &sales[i];
            if sale.token != minted[i].token {
                return Err(Error::invalid_input(format!(
                    "sale {i} currency {} is not tranche token {}",
                    sale.token, minted[i].token
                )));
            }
            if sale.amount > minted[i].amount {
                return Err(Error::invalid_input(format!(
                    "sale {i} of {} exceeds the minted {}",
                    sale.amount, minted[i].amount
                )));
            }

            let out = venue.quote_output(sale).await?;
            currency_output += out.amount;
            tranche_tokens.push(TokenAmount::new(
                minted[i].token.clone(),
                &minted[i].amount - &sale.amount,
            ));
        }
        tranche_tokens.push(minted[minted.len() - 1].clone());

        Ok(BorrowOutput {
            tranche_tokens,
            currency_output: TokenAmount::new(self.currency.clone(), currency_output),
        })
    }
}
