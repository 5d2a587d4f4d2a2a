use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::AccountMeta,
    program_pack::{IsInitialized, Pack},
    pubkey::Pubkey,
};
use spl_token::state::{Account as SplTokenAccount, Mint as SplMint};

use crate::{
    amm::*,
    constants::{ORCA_TOKEN_SWAP_PROGRAM_ID, SWAP_INSTRUCTION_TAG},
    error::{Error, Result},
};

pub const SWAP_VERSION_V1: u8 = 1;
pub const CONSTANT_PRODUCT_CURVE: u8 = 0;

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq)]
pub struct Fees {
    pub trade_fee_numerator: u64,
    pub trade_fee_denominator: u64,
    pub owner_trade_fee_numerator: u64,
    pub owner_trade_fee_denominator: u64,
    pub owner_withdraw_fee_numerator: u64,
    pub owner_withdraw_fee_denominator: u64,
    pub host_fee_numerator: u64,
    pub host_fee_denominator: u64,
}

/// token-swap pool account, without the leading version byte
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq)]
pub struct TokenSwap {
    pub is_initialized: bool,
    pub bump_seed: u8,

    // pubkeys
    pub token_program_id: Pubkey,
    pub token_account_a: Pubkey,
    pub token_account_b: Pubkey,
    pub pool_mint: Pubkey,
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    pub pool_fee_account: Pubkey,

    pub fees: Fees,

    // curve
    pub curve_type: u8,
    pub curve_parameters: [u8; 32],
}

#[derive(Clone, Debug)]
pub struct OrcaAmm {
    pub key: Pubkey,
    pub swap: TokenSwap,
    pub reserve_a_balance: u64,
    pub reserve_b_balance: u64,
    pub token_a_decimals: u8,
    pub token_b_decimals: u8,
    pub lp_supply: u64,
    pub lp_decimals: u8,
}

impl OrcaAmm {
    pub fn authority(&self) -> Result<Pubkey> {
        Pubkey::create_program_address(
            &[self.key.as_ref(), &[self.swap.bump_seed]],
            &ORCA_TOKEN_SWAP_PROGRAM_ID,
        )
        .map_err(|e| Error::InvalidPool {
            key: self.key,
            reason: format!("bad authority seed: {}", e),
        })
    }

    pub fn token_program_id(&self) -> Pubkey {
        self.swap.token_program_id
    }

    pub fn is_token_a(&self, mint: &Pubkey) -> Result<bool> {
        if *mint == self.swap.token_a_mint {
            Ok(true)
        } else if *mint == self.swap.token_b_mint {
            Ok(false)
        } else {
            Err(Error::TokenNotInPool(*mint))
        }
    }

    fn decode_swap(key: Pubkey, data: &[u8]) -> Result<TokenSwap> {
        let invalid = |reason: String| Error::InvalidPool { key, reason };

        let (version, body) = data
            .split_first()
            .ok_or_else(|| invalid("empty account data".to_string()))?;
        if *version != SWAP_VERSION_V1 {
            return Err(invalid(format!("unsupported swap version {}", version)));
        }

        let swap = TokenSwap::deserialize(&mut &body[..]).map_err(|e| invalid(e.to_string()))?;
        if !swap.is_initialized {
            return Err(invalid("pool is not initialized".to_string()));
        }
        if swap.curve_type != CONSTANT_PRODUCT_CURVE {
            return Err(invalid(format!("unsupported curve type {}", swap.curve_type)));
        }

        Ok(swap)
    }
}

impl Amm for OrcaAmm {
    fn from_keyed_account(pool: &KeyedAccount) -> Result<Self>
    where
        Self: Sized,
    {
        if pool.account.owner != ORCA_TOKEN_SWAP_PROGRAM_ID {
            return Err(Error::InvalidPool {
                key: pool.key,
                reason: format!("owned by {}", pool.account.owner),
            });
        }

        Ok(OrcaAmm {
            key: pool.key,
            swap: Self::decode_swap(pool.key, &pool.account.data)?,
            reserve_a_balance: 0,
            reserve_b_balance: 0,
            token_a_decimals: 0,
            token_b_decimals: 0,
            lp_supply: 0,
            lp_decimals: 0,
        })
    }

    fn get_accounts_to_update(&self) -> Vec<Pubkey> {
        vec![
            self.key,
            self.swap.token_account_a, // pool token reserves
            self.swap.token_account_b,
            self.swap.token_a_mint, // decimals
            self.swap.token_b_mint,
            self.swap.pool_mint, // lp supply
        ]
    }

    fn update(&mut self, account_map: &AccountMap) -> Result<()> {
        let pool_data = try_get_account_data(account_map, &self.key, self.key)?;
        self.swap = Self::decode_swap(self.key, pool_data)?;

        let reserve_a =
            unpack::<SplTokenAccount>(account_map, &self.swap.token_account_a, self.key)?;
        let reserve_b =
            unpack::<SplTokenAccount>(account_map, &self.swap.token_account_b, self.key)?;
        let mint_a = unpack::<SplMint>(account_map, &self.swap.token_a_mint, self.key)?;
        let mint_b = unpack::<SplMint>(account_map, &self.swap.token_b_mint, self.key)?;
        let pool_mint = unpack::<SplMint>(account_map, &self.swap.pool_mint, self.key)?;

        self.reserve_a_balance = reserve_a.amount;
        self.reserve_b_balance = reserve_b.amount;
        self.token_a_decimals = mint_a.decimals;
        self.token_b_decimals = mint_b.decimals;
        self.lp_supply = pool_mint.supply;
        self.lp_decimals = pool_mint.decimals;

        Ok(())
    }

    fn quote(&self, quote_params: &QuoteParams) -> Result<Quote> {
        let is_a_to_b = self.is_token_a(&quote_params.input_mint)?;
        let (source_reserve, destination_reserve) = if is_a_to_b {
            (self.reserve_a_balance, self.reserve_b_balance)
        } else {
            (self.reserve_b_balance, self.reserve_a_balance)
        };

        let fees = &self.swap.fees;
        let amount = quote_params.amount as u128;
        let trade_fee = trading_fee(amount, fees.trade_fee_numerator, fees.trade_fee_denominator)
            .ok_or(Error::Math("trade fee"))?;
        let owner_fee = trading_fee(
            amount,
            fees.owner_trade_fee_numerator,
            fees.owner_trade_fee_denominator,
        )
        .ok_or(Error::Math("owner fee"))?;

        let fee_amount = trade_fee
            .checked_add(owner_fee)
            .ok_or(Error::Math("fee total"))?;
        let amount_after_fees = amount
            .checked_sub(fee_amount)
            .ok_or(Error::Math("amount after fees"))?;

        let out_amount = swap_without_fees(
            amount_after_fees,
            source_reserve as u128,
            destination_reserve as u128,
        )
        .ok_or(Error::Math("swap output"))?;

        let no_slippage_out_amount = amount_after_fees
            .checked_mul(destination_reserve as u128)
            .and_then(|v| v.checked_div(source_reserve as u128))
            .ok_or(Error::Math("spot output"))?;

        Ok(Quote {
            in_amount: quote_params.amount,
            out_amount: u64::try_from(out_amount).map_err(|_| Error::Math("swap output"))?,
            fee_amount: u64::try_from(fee_amount).map_err(|_| Error::Math("fee total"))?,
            no_slippage_out_amount,
        })
    }

    fn get_swap_and_account_metas(&self, swap_params: &SwapParams) -> Result<SwapAndAccountMetas> {
        let is_a_to_b = self.is_token_a(&swap_params.source_mint)?;
        let (swap_source, swap_destination) = if is_a_to_b {
            (self.swap.token_account_a, self.swap.token_account_b)
        } else {
            (self.swap.token_account_b, self.swap.token_account_a)
        };

        let mut data = vec![SWAP_INSTRUCTION_TAG];
        data.extend_from_slice(&swap_params.amount_in.to_le_bytes());
        data.extend_from_slice(&swap_params.minimum_amount_out.to_le_bytes());

        let account_metas = vec![
            AccountMeta::new_readonly(self.key, false),
            AccountMeta::new_readonly(self.authority()?, false),
            AccountMeta::new_readonly(swap_params.user_transfer_authority, true),
            AccountMeta::new(swap_params.user_source, false),
            AccountMeta::new(swap_source, false),
            AccountMeta::new(swap_destination, false),
            AccountMeta::new(swap_params.user_destination, false),
            AccountMeta::new(self.swap.pool_mint, false),
            AccountMeta::new(self.swap.pool_fee_account, false),
            AccountMeta::new_readonly(self.swap.token_program_id, false),
        ];

        Ok(SwapAndAccountMetas {
            data,
            account_metas,
        })
    }
}

/// Fee charged by the token-swap program: at least one unit whenever the rate is non-zero
fn trading_fee(amount: u128, numerator: u64, denominator: u64) -> Option<u128> {
    if numerator == 0 || amount == 0 {
        return Some(0);
    }
    let fee = amount
        .checked_mul(numerator as u128)?
        .checked_div(denominator as u128)?;
    Some(fee.max(1))
}

/// Constant product output, rounding the new destination reserve up
fn swap_without_fees(
    source_amount: u128,
    source_reserve: u128,
    destination_reserve: u128,
) -> Option<u128> {
    let invariant = source_reserve.checked_mul(destination_reserve)?;
    let new_source_reserve = source_reserve.checked_add(source_amount)?;
    if new_source_reserve == 0 {
        return None;
    }
    let new_destination_reserve = invariant.div_ceil(new_source_reserve);
    destination_reserve.checked_sub(new_destination_reserve)
}

fn try_get_account_data<'a>(
    account_map: &'a AccountMap,
    address: &Pubkey,
    pool: Pubkey,
) -> Result<&'a [u8]> {
    account_map
        .get(address)
        .map(|account| account.data.as_slice())
        .ok_or_else(|| Error::InvalidPool {
            key: pool,
            reason: format!("account {} not found", address),
        })
}

fn unpack<T: Pack + IsInitialized>(
    account_map: &AccountMap,
    address: &Pubkey,
    pool: Pubkey,
) -> Result<T> {
    let data = try_get_account_data(account_map, address, pool)?;
    T::unpack(data).map_err(|e| Error::InvalidPool {
        key: pool,
        reason: format!("failed to unpack {}: {}", address, e),
    })
}
