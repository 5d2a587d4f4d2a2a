use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use solana_sdk::{
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token::state::Account as SplTokenAccount;
use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    amm::{AccountData, Amm, KeyedAccount, QuoteParams, SwapParams},
    connection::Connection,
    constants::{
        ETH_USDC_POOL, LAMPORTS_PER_SIGNATURE, ORCA_TOKEN_SWAP_PROGRAM_ID, ORCA_USDC_POOL,
        TOKEN_NAMES,
    },
    error::{Error, Result},
    orca_amm::OrcaAmm,
    utils::{from_raw_amount, short_mint_name, to_raw_amount},
};

const SOL_DECIMALS: u8 = 9;
const SWAP_SIGNATURES: u64 = 1;

/// A named pool address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub name: &'static str,
    pub address: Pubkey,
}

impl PoolConfig {
    pub const ETH_USDC: PoolConfig = PoolConfig {
        name: "ETH_USDC",
        address: ETH_USDC_POOL,
    };
    pub const ORCA_USDC: PoolConfig = PoolConfig {
        name: "ORCA_USDC",
        address: ORCA_USDC_POOL,
    };

    pub const ALL: [PoolConfig; 2] = [Self::ETH_USDC, Self::ORCA_USDC];

    /// Look up a pool by name, case-insensitive
    pub fn from_name(name: &str) -> Option<PoolConfig> {
        Self::ALL
            .into_iter()
            .find(|pool| pool.name.eq_ignore_ascii_case(name))
    }
}

/// One side of a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolToken {
    pub name: String,
    pub mint: Pubkey,
    /// the pool's reserve account for this token
    pub vault: Pubkey,
    pub decimals: u8,
}

/// Swap estimate, amounts in token units
#[derive(Debug, Clone, PartialEq)]
pub struct SwapQuote {
    /// output tokens per input token
    pub rate: Decimal,
    /// percentage lost against the spot price
    pub price_impact: Decimal,
    /// pool fees, in the input token
    pub lp_fees: Decimal,
    /// transaction fees, in SOL
    pub network_fees: Decimal,
    pub expected_output: Decimal,
    pub min_output: Decimal,
}

impl fmt::Display for SwapQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ rate: {}, impact: {}, lpFees: {}, fees: {}, expected: {}, min: {} }}",
            self.rate,
            self.price_impact,
            self.lp_fees,
            self.network_fees,
            self.expected_output,
            self.min_output
        )
    }
}

/// Entry point for pool operations on a cluster
pub struct Orca {
    connection: Arc<Connection>,
}

impl Orca {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// Load a pool and its current reserves
    ///
    /// # Errors
    /// Returns `Error::PoolNotFound` if the pool account does not exist
    pub async fn get_pool(&self, config: PoolConfig) -> Result<OrcaPool> {
        let rpc_client = &self.connection.rpc_client;
        let pool_account = rpc_client
            .get_account_with_commitment(&config.address, rpc_client.commitment())
            .await?
            .value
            .ok_or(Error::PoolNotFound(config.address))?;

        let amm = OrcaAmm::from_keyed_account(&KeyedAccount {
            key: config.address,
            account: AccountData {
                data: pool_account.data,
                owner: pool_account.owner,
            },
        })?;

        let mut pool = OrcaPool {
            connection: self.connection.clone(),
            config,
            amm,
        };
        pool.update_accounts().await?;

        log::debug!(
            "Loaded pool {} ({}) reserves {}/{}",
            config.name,
            config.address,
            pool.amm.reserve_a_balance,
            pool.amm.reserve_b_balance
        );

        Ok(pool)
    }
}

#[derive(Debug)]
pub struct OrcaPool {
    connection: Arc<Connection>,
    config: PoolConfig,
    amm: OrcaAmm,
}

impl OrcaPool {
    pub fn token_a(&self) -> PoolToken {
        self.pool_token(
            self.amm.swap.token_a_mint,
            self.amm.swap.token_account_a,
            self.amm.token_a_decimals,
        )
    }

    pub fn token_b(&self) -> PoolToken {
        self.pool_token(
            self.amm.swap.token_b_mint,
            self.amm.swap.token_account_b,
            self.amm.token_b_decimals,
        )
    }

    pub fn lp_mint(&self) -> Pubkey {
        self.amm.swap.pool_mint
    }

    /// Refresh pool reserves and supplies from the chain
    pub async fn update_accounts(&mut self) -> Result<()> {
        let accounts_to_update = self.amm.get_accounts_to_update();
        let accounts = self
            .connection
            .rpc_client
            .get_multiple_accounts(&accounts_to_update)
            .await?;

        let account_map: HashMap<Pubkey, AccountData> = accounts_to_update
            .into_iter()
            .zip(accounts)
            .filter_map(|(key, account)| {
                account.map(|account| {
                    (
                        key,
                        AccountData {
                            data: account.data,
                            owner: account.owner,
                        },
                    )
                })
            })
            .collect();

        self.amm.update(&account_map)
    }

    /// LP tokens held by `owner` in its associated token account, zero if it has none
    pub async fn lp_balance(&self, owner: &Pubkey) -> Result<Decimal> {
        let rpc_client = &self.connection.rpc_client;
        let lp_account = get_associated_token_address_with_program_id(
            owner,
            &self.lp_mint(),
            &self.amm.token_program_id(),
        );

        let raw = match rpc_client
            .get_account_with_commitment(&lp_account, rpc_client.commitment())
            .await?
            .value
        {
            Some(account) => {
                SplTokenAccount::unpack(&account.data)
                    .map_err(|e| Error::InvalidPool {
                        key: self.config.address,
                        reason: format!("bad LP token account {}: {}", lp_account, e),
                    })?
                    .amount
            }
            None => 0,
        };

        from_raw_amount(raw, self.amm.lp_decimals)
    }

    /// Total LP token supply
    pub async fn lp_supply(&mut self) -> Result<Decimal> {
        self.update_accounts().await?;
        from_raw_amount(self.amm.lp_supply, self.amm.lp_decimals)
    }

    /// Estimate a swap of `amount` of `input` against current reserves
    ///
    /// # Arguments
    /// * `input` - The token being sold, one of `token_a()` / `token_b()`
    /// * `amount` - Amount of the input token
    /// * `slippage` - Slippage tolerance in percent (`0.1` = 0.1%)
    pub async fn quote(
        &mut self,
        input: &PoolToken,
        amount: Decimal,
        slippage: Decimal,
    ) -> Result<SwapQuote> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(format!("{} must be positive", amount)));
        }
        if slippage.is_sign_negative() || slippage > Decimal::ONE_HUNDRED {
            return Err(Error::InvalidAmount(format!(
                "slippage {}% out of range",
                slippage
            )));
        }

        self.update_accounts().await?;
        self.build_quote(input, amount, slippage)
    }

    fn build_quote(
        &self,
        input: &PoolToken,
        amount: Decimal,
        slippage: Decimal,
    ) -> Result<SwapQuote> {
        let output = self.output_token(input)?;
        let raw_amount = to_raw_amount(amount, input.decimals)?;

        let quote = self.amm.quote(&QuoteParams {
            input_mint: input.mint,
            amount: raw_amount,
        })?;

        let expected_output = from_raw_amount(quote.out_amount, output.decimals)?;

        let min_raw = Decimal::from(quote.out_amount)
            .checked_mul(Decimal::ONE_HUNDRED - slippage)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(Error::Math("minimum output"))?
            .floor();
        let min_output = from_raw_amount(
            min_raw.to_u64().ok_or(Error::Math("minimum output"))?,
            output.decimals,
        )?;

        let no_slippage_out =
            Decimal::from_u128(quote.no_slippage_out_amount).ok_or(Error::Math("spot output"))?;
        let price_impact = if no_slippage_out.is_zero() {
            Decimal::ZERO
        } else {
            (no_slippage_out - Decimal::from(quote.out_amount)) / no_slippage_out
                * Decimal::ONE_HUNDRED
        };

        let rate = if raw_amount == 0 {
            Decimal::ZERO
        } else {
            expected_output
                .checked_div(amount)
                .ok_or(Error::Math("rate"))?
        };

        Ok(SwapQuote {
            rate: rate.normalize(),
            price_impact: price_impact.normalize(),
            lp_fees: from_raw_amount(quote.fee_amount, input.decimals)?,
            network_fees: from_raw_amount(
                LAMPORTS_PER_SIGNATURE * SWAP_SIGNATURES,
                SOL_DECIMALS,
            )?,
            expected_output,
            min_output,
        })
    }

    /// Build a swap of `amount` of `input` for the other pool token
    ///
    /// The returned payload creates the owner's output token account if needed.
    pub fn swap<'a>(
        &self,
        owner: &'a Keypair,
        input: &PoolToken,
        amount: Decimal,
        min_output: Decimal,
    ) -> Result<SwapPayload<'a>> {
        let output = self.output_token(input)?;
        let owner_pubkey = owner.pubkey();
        let token_program_id = self.amm.token_program_id();

        let user_source = get_associated_token_address_with_program_id(
            &owner_pubkey,
            &input.mint,
            &token_program_id,
        );
        let user_destination = get_associated_token_address_with_program_id(
            &owner_pubkey,
            &output.mint,
            &token_program_id,
        );

        let swap_and_account_metas = self.amm.get_swap_and_account_metas(&SwapParams {
            source_mint: input.mint,
            user_transfer_authority: owner_pubkey,
            user_source,
            user_destination,
            amount_in: to_raw_amount(amount, input.decimals)?,
            minimum_amount_out: to_raw_amount(min_output, output.decimals)?,
        })?;

        let create_destination_ix = create_associated_token_account_idempotent(
            &owner_pubkey,
            &owner_pubkey,
            &output.mint,
            &token_program_id,
        );

        let swap_ix = Instruction {
            program_id: ORCA_TOKEN_SWAP_PROGRAM_ID,
            accounts: swap_and_account_metas.account_metas,
            data: swap_and_account_metas.data,
        };

        Ok(SwapPayload {
            connection: self.connection.clone(),
            owner,
            instructions: vec![create_destination_ix, swap_ix],
        })
    }

    fn output_token(&self, input: &PoolToken) -> Result<PoolToken> {
        if self.amm.is_token_a(&input.mint)? {
            Ok(self.token_b())
        } else {
            Ok(self.token_a())
        }
    }

    fn pool_token(&self, mint: Pubkey, vault: Pubkey, decimals: u8) -> PoolToken {
        let name = TOKEN_NAMES
            .get(&mint)
            .map(|name| name.to_string())
            .unwrap_or_else(|| short_mint_name(&mint));

        PoolToken {
            name,
            mint,
            vault,
            decimals,
        }
    }
}

/// A ready-to-sign swap
pub struct SwapPayload<'a> {
    connection: Arc<Connection>,
    owner: &'a Keypair,
    instructions: Vec<Instruction>,
}

impl SwapPayload<'_> {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Sign with the owner, send and wait for confirmation
    pub async fn execute(&self) -> Result<Signature> {
        let rpc_client = &self.connection.rpc_client;
        let recent_blockhash = rpc_client.get_latest_blockhash().await?;

        let transaction = Transaction::new_signed_with_payer(
            &self.instructions,
            Some(&self.owner.pubkey()),
            &[self.owner],
            recent_blockhash,
        );

        let signature = rpc_client.send_and_confirm_transaction(&transaction).await?;
        log::info!("Swap confirmed: {}", signature);

        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orca_amm::tests::loaded_amm;
    use assert_matches::assert_matches;
    use serde_json::json;
    use solana_rpc_client::nonblocking::rpc_client::RpcClient;
    use solana_rpc_client_api::{request::RpcRequest, response::RpcVersionInfo};
    use solana_sdk::commitment_config::CommitmentConfig;

    fn mock_connection() -> Arc<Connection> {
        // pool lookups see an empty account
        let mocks = HashMap::from([(
            RpcRequest::GetAccountInfo,
            json!({ "context": { "slot": 1 }, "value": null }),
        )]);

        Arc::new(Connection {
            rpc_client: RpcClient::new_mock_with_mocks("succeeds".to_string(), mocks),
            url: "succeeds".to_string(),
            commitment: CommitmentConfig::confirmed(),
            version: RpcVersionInfo {
                solana_core: "2.1.0".to_string(),
                feature_set: None,
            },
        })
    }

    fn sample_pool() -> OrcaPool {
        OrcaPool {
            connection: mock_connection(),
            config: PoolConfig::ORCA_USDC,
            amm: loaded_amm(1_000_000, 2_000_000),
        }
    }

    #[test]
    fn test_pool_config_from_name() {
        assert_eq!(PoolConfig::from_name("eth_usdc"), Some(PoolConfig::ETH_USDC));
        assert_eq!(PoolConfig::from_name("ORCA_USDC"), Some(PoolConfig::ORCA_USDC));
        assert_eq!(PoolConfig::from_name("SOL_USDC"), None);
    }

    #[test]
    fn test_pool_tokens() {
        let pool = sample_pool();
        let token_a = pool.token_a();
        let token_b = pool.token_b();

        assert_eq!(token_a.mint, pool.amm.swap.token_a_mint);
        assert_eq!(token_a.vault, pool.amm.swap.token_account_a);
        assert_eq!(token_b.decimals, 6);
        assert_eq!(token_a.name, short_mint_name(&token_a.mint));
        assert_eq!(pool.lp_mint(), pool.amm.swap.pool_mint);
    }

    #[test]
    fn test_build_quote() {
        let pool = sample_pool();
        let token_a = pool.token_a();

        let quote = pool
            .build_quote(&token_a, Decimal::new(1, 2), Decimal::ONE)
            .unwrap();

        assert_eq!(quote.expected_output, Decimal::new(19_743, 6));
        assert_eq!(quote.lp_fees, Decimal::new(30, 6));
        // floor(19_743 * 0.99)
        assert_eq!(quote.min_output, Decimal::new(19_545, 6));
        assert_eq!(quote.rate, Decimal::new(19_743, 4));
        assert_eq!(quote.network_fees, Decimal::new(5, 6));
        assert!(quote.price_impact > Decimal::ZERO);
        assert!(quote.price_impact < Decimal::ONE);
    }

    #[tokio::test]
    async fn test_quote_rejects_bad_input() {
        let mut pool = sample_pool();
        let token_a = pool.token_a();

        assert_matches!(
            pool.quote(&token_a, Decimal::ZERO, Decimal::ONE).await,
            Err(Error::InvalidAmount(_))
        );
        assert_matches!(
            pool.quote(&token_a, Decimal::ONE, Decimal::from(101)).await,
            Err(Error::InvalidAmount(_))
        );
    }

    #[test]
    fn test_quote_token_not_in_pool() {
        let pool = sample_pool();
        let stranger = PoolToken {
            name: "X".to_string(),
            mint: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            decimals: 6,
        };
        assert_matches!(
            pool.build_quote(&stranger, Decimal::ONE, Decimal::ONE),
            Err(Error::TokenNotInPool(_))
        );
    }

    #[test]
    fn test_swap_payload() {
        let pool = sample_pool();
        let owner = Keypair::new();
        let token_b = pool.token_b();

        let payload = pool
            .swap(&owner, &token_b, Decimal::new(1, 1), Decimal::new(4, 2))
            .unwrap();
        let instructions = payload.instructions();

        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].program_id, spl_associated_token_account::ID);
        assert_eq!(instructions[1].program_id, ORCA_TOKEN_SWAP_PROGRAM_ID);
        assert_eq!(&instructions[1].data[1..9], &100_000u64.to_le_bytes());
        assert_eq!(&instructions[1].data[9..17], &40_000u64.to_le_bytes());
        assert_eq!(instructions[1].accounts[2].pubkey, owner.pubkey());
    }

    #[tokio::test]
    async fn test_get_pool_not_found() {
        let orca = Orca::new(mock_connection());
        let result = orca.get_pool(PoolConfig::ETH_USDC).await;
        assert_matches!(result, Err(Error::PoolNotFound(key)) if key == ETH_USDC_POOL);
    }
}
