use alloy::sol;

sol! {
    /// The payment processor contract.
    ///
    /// Native payments are plain value transfers handled by the contract's `receive` function.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IPaymentProcessor {
        /// A payment as stored by the contract.
        ///
        /// `paymentType` is `0` for native payments and `1` for token payments.
        struct Payment {
            address payer;
            uint256 amount;
            uint256 timestamp;
            uint8 paymentType;
            bool isDiscounted;
        }

        /// Emitted for every processed payment.
        event PaymentProcessed(address indexed payer, uint256 indexed amount, uint256 indexed paymentId);

        /// Discount percentage of a user.
        function userDiscounts(address user) external view returns (uint256);

        /// Whether a token is accepted for payments.
        function acceptedTokens(address token) external view returns (bool);

        /// All payments processed by the contract.
        function getAllPayments() external view returns (Payment[] memory);

        /// All payments made by `user`.
        function getUserPayments(address user) external view returns (Payment[] memory);

        /// Pays `amount` of `token`. Requires a prior ERC-20 approval.
        function payWithToken(address token, uint256 amount) external;

        /// Accepts a new payment token. Owner only.
        function addAcceptedToken(address token) external;

        /// Sets the discount percentage of `user`. Owner only.
        function setDiscount(address user, uint256 percent) external;

        /// Withdraws the native balance of the contract. Owner only.
        function withdrawBNB() external;
    }
}
